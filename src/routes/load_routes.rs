//! Endpoints del libro de carga

use axum::{
    extract::{Path, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::load_controller::LoadController;
use crate::dto::common::ApiResponse;
use crate::dto::load_dto::{
    AssignOrderRequest, AssignProductRequest, LoadProductResponse, LoadResponse,
    SetInitialCashRequest,
};
use crate::dto::route_dto::RouteResponse;
use crate::middleware::actor::ActorContext;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_load_router() -> Router<AppState> {
    Router::new()
        .route("/:id/load", get(get_load))
        .route("/:id/load/products", post(assign_product))
        .route("/:id/load/products/:product_id", delete(remove_product))
        .route("/:id/load/orders", post(assign_order))
        .route("/:id/load/orders/:order_id", delete(remove_order))
        .route("/:id/load/cash", patch(set_initial_cash))
        .route("/:id/load/send", post(send_to_execution))
}

async fn get_load(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
) -> Result<Json<LoadResponse>, AppError> {
    let controller = LoadController::new(state.pool.clone());
    let response = controller.get_load(actor.tenant_id, route_id).await?;
    Ok(Json(response))
}

async fn assign_product(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
    Json(request): Json<AssignProductRequest>,
) -> Result<Json<ApiResponse<LoadProductResponse>>, AppError> {
    let controller = LoadController::new(state.pool.clone());
    let response = controller
        .assign_product(actor.tenant_id, route_id, request)
        .await?;
    Ok(Json(response))
}

async fn remove_product(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((route_id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = LoadController::new(state.pool.clone());
    controller
        .remove_product(actor.tenant_id, route_id, product_id)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Producto retirado de la carga"
    })))
}

async fn assign_order(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
    Json(request): Json<AssignOrderRequest>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    let controller = LoadController::new(state.pool.clone());
    let response = controller
        .assign_order(actor.tenant_id, route_id, request)
        .await?;
    Ok(Json(response))
}

async fn remove_order(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((route_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = LoadController::new(state.pool.clone());
    controller
        .remove_order(actor.tenant_id, route_id, order_id)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Pedido retirado de la ruta"
    })))
}

async fn set_initial_cash(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
    Json(request): Json<SetInitialCashRequest>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let controller = LoadController::new(state.pool.clone());
    let response = controller
        .set_initial_cash(actor.tenant_id, route_id, request)
        .await?;
    Ok(Json(response))
}

async fn send_to_execution(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let controller = LoadController::new(state.pool.clone());
    let response = controller
        .send_to_execution(actor.tenant_id, route_id)
        .await?;
    Ok(Json(response))
}
