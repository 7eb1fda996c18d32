mod config;
mod controllers;
mod database;
mod dto;
mod events;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::DatabaseConnection;
use events::EventBus;
use middleware::cors::cors_middleware;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚚 Ruta Ventas - Motor de ejecución y cierre de rutas");
    info!("====================================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();
    let config = EnvironmentConfig::from_env();

    // Bus de eventos de dominio: los suscriptores externos
    // (notificaciones, facturación) se enganchan aquí
    let events = EventBus::default();
    let mut event_log = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = event_log.recv().await {
            info!("📣 Evento de ruta: {:?}", event);
        }
    });

    let app_state = AppState::new(pool, config.clone(), events);

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .merge(routes::create_api_router())
        .layer(cors_middleware())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🛣️  Rutas:");
    info!("   POST /api/routes - Crear ruta (borrador)");
    info!("   GET  /api/routes - Listar rutas (status, user_id, from, to)");
    info!("   GET  /api/routes/:id - Detalle con paradas y carga");
    info!("   POST /api/routes/:id/start - Iniciar ruta");
    info!("   POST /api/routes/:id/complete - Completar ruta");
    info!("   POST /api/routes/:id/cancel - Cancelar ruta");
    info!("📍 Paradas:");
    info!("   POST /api/routes/:id/stops - Agregar parada");
    info!("   DELETE /api/routes/:id/stops/:stop_id - Eliminar parada");
    info!("   POST /api/routes/:id/stops/reorder - Reordenar paradas");
    info!("   GET  /api/routes/:id/current-stop - Parada actual");
    info!("   GET  /api/routes/:id/next-stop - Próxima parada");
    info!("   POST /api/stops/:id/arrive|depart|skip - Ejecución de parada");
    info!("📦 Carga:");
    info!("   GET  /api/routes/:id/load - Ver carga");
    info!("   POST /api/routes/:id/load/products - Asignar producto");
    info!("   POST /api/routes/:id/load/orders - Asignar pedido");
    info!("   PATCH /api/routes/:id/load/cash - Caja inicial");
    info!("   POST /api/routes/:id/load/send - Enviar a ejecución");
    info!("💰 Cierre:");
    info!("   GET  /api/routes/:id/closing/returns - Líneas de retorno");
    info!("   PATCH /api/routes/:id/closing/returns/:product_id - Corregir línea");
    info!("   GET  /api/routes/:id/closing/summary - Resumen de cierre");
    info!("   POST /api/routes/:id/closing/close - Cerrar ruta");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "ruta-ventas",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
