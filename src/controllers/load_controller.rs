//! Controlador del libro de carga

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::load_dto::{
    AssignOrderRequest, AssignProductRequest, LoadProductResponse, LoadResponse,
    SetInitialCashRequest,
};
use crate::dto::route_dto::RouteResponse;
use crate::models::load::{self, LoadProduct};
use crate::repositories::catalog_repository::CatalogRepository;
use crate::repositories::load_repository::LoadRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::utils::errors::{not_found_error, AppResult};

pub struct LoadController {
    load: LoadRepository,
    routes: RouteRepository,
    catalog: CatalogRepository,
}

impl LoadController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            load: LoadRepository::new(pool.clone()),
            routes: RouteRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool),
        }
    }

    pub async fn get_load(&self, tenant_id: Uuid, route_id: Uuid) -> AppResult<LoadResponse> {
        let route = self
            .routes
            .find_by_id(tenant_id, route_id)
            .await?
            .ok_or_else(|| not_found_error("route", &route_id.to_string()))?;

        let products = self.load.get_products(route_id).await?;
        let orders = self.load.get_orders(route_id).await?;
        let valor_carga: Decimal = products.iter().map(LoadProduct::total_value).sum();

        Ok(LoadResponse {
            route_id,
            products: products.into_iter().map(LoadProductResponse::from).collect(),
            order_ids: load::order_ids(&orders),
            caja_inicial: route.caja_inicial,
            caja_inicial_comment: route.caja_inicial_comment,
            load_finalized: route.load_finalized,
            valor_carga,
        })
    }

    pub async fn assign_product(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        request: AssignProductRequest,
    ) -> AppResult<ApiResponse<LoadProductResponse>> {
        request.validate()?;

        // Sin precio explícito se toma el precio base del catálogo
        let unit_price = match request.unit_price {
            Some(price) => price,
            None => self
                .catalog
                .base_price(tenant_id, request.product_id)
                .await?
                .ok_or_else(|| not_found_error("product", &request.product_id.to_string()))?,
        };

        let product = self
            .load
            .assign_product(
                tenant_id,
                route_id,
                request.product_id,
                request.cantidad_entrega,
                request.cantidad_venta,
                unit_price,
                request.warehouse_qty,
            )
            .await?;

        info!(
            "Producto {} asignado a la ruta {} (entrega {}, venta {})",
            product.product_id, route_id, product.cantidad_entrega, product.cantidad_venta
        );

        Ok(ApiResponse::success_with_message(
            product.into(),
            "Producto asignado a la carga".to_string(),
        ))
    }

    pub async fn remove_product(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<()> {
        self.load.remove_product(tenant_id, route_id, product_id).await?;
        info!("Producto {} retirado de la carga de la ruta {}", product_id, route_id);
        Ok(())
    }

    pub async fn assign_order(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        request: AssignOrderRequest,
    ) -> AppResult<ApiResponse<Uuid>> {
        self.load
            .assign_order(tenant_id, route_id, request.order_id)
            .await?;

        info!("Pedido {} asignado a la ruta {}", request.order_id, route_id);
        Ok(ApiResponse::success_with_message(
            request.order_id,
            "Pedido asignado a la ruta".to_string(),
        ))
    }

    pub async fn remove_order(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        order_id: Uuid,
    ) -> AppResult<()> {
        self.load.remove_order(tenant_id, route_id, order_id).await?;
        info!("Pedido {} retirado de la ruta {}", order_id, route_id);
        Ok(())
    }

    pub async fn set_initial_cash(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        request: SetInitialCashRequest,
    ) -> AppResult<ApiResponse<RouteResponse>> {
        request.validate()?;

        let route = self
            .load
            .set_initial_cash(tenant_id, route_id, request.amount, request.comment)
            .await?;

        info!("Caja inicial de la ruta {} fijada en {}", route_id, route.caja_inicial);
        Ok(ApiResponse::success_with_message(
            route.into(),
            "Caja inicial actualizada".to_string(),
        ))
    }

    pub async fn send_to_execution(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
    ) -> AppResult<ApiResponse<RouteResponse>> {
        let route = self.load.send_to_execution(tenant_id, route_id).await?;

        info!("Carga de la ruta {} enviada a ejecución", route_id);
        Ok(ApiResponse::success_with_message(
            route.into(),
            "Carga finalizada y enviada a ejecución".to_string(),
        ))
    }
}
