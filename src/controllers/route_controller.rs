//! Controlador del ciclo de vida de rutas

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::route_dto::{
    CancelRouteRequest, CompleteRouteRequest, CompleteRouteResponse, CreateRouteRequest,
    RouteDetailResponse, RouteResponse, StartRouteRequest, UpdateRouteRequest,
};
use crate::events::{EventBus, RouteEvent};
use crate::models::load;
use crate::models::route::RouteFilters;
use crate::repositories::load_repository::LoadRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::repositories::stop_repository::StopRepository;
use crate::utils::errors::{not_found_error, AppResult};

pub struct RouteController {
    routes: RouteRepository,
    stops: StopRepository,
    load: LoadRepository,
    events: EventBus,
}

impl RouteController {
    pub fn new(pool: PgPool, events: EventBus) -> Self {
        Self {
            routes: RouteRepository::new(pool.clone()),
            stops: StopRepository::new(pool.clone()),
            load: LoadRepository::new(pool),
            events,
        }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        request: CreateRouteRequest,
    ) -> AppResult<ApiResponse<RouteResponse>> {
        request.validate()?;

        let route = self.routes.create(tenant_id, request).await?;
        info!("Ruta '{}' creada en borrador ({})", route.name, route.id);

        Ok(ApiResponse::success_with_message(
            route.into(),
            "Ruta creada exitosamente".to_string(),
        ))
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filters: RouteFilters,
    ) -> AppResult<Vec<RouteResponse>> {
        let routes = self.routes.list(tenant_id, filters).await?;
        Ok(routes.into_iter().map(RouteResponse::from).collect())
    }

    pub async fn get_detail(&self, tenant_id: Uuid, id: Uuid) -> AppResult<RouteDetailResponse> {
        let route = self
            .routes
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| not_found_error("route", &id.to_string()))?;

        let stops = self.stops.list_by_route(id).await?;
        let load_products = self.load.get_products(id).await?;
        let load_orders = self.load.get_orders(id).await?;

        Ok(RouteDetailResponse {
            route: route.into(),
            stops,
            load_products,
            load_order_ids: load::order_ids(&load_orders),
        })
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        request: UpdateRouteRequest,
    ) -> AppResult<ApiResponse<RouteResponse>> {
        request.validate()?;

        let route = self.routes.update(tenant_id, id, request).await?;
        Ok(ApiResponse::success_with_message(
            route.into(),
            "Ruta actualizada exitosamente".to_string(),
        ))
    }

    pub async fn start(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        request: StartRouteRequest,
    ) -> AppResult<ApiResponse<RouteResponse>> {
        let route = self
            .routes
            .start(tenant_id, id, request.start_lat, request.start_lng)
            .await?;

        info!("Ruta {} iniciada por el usuario {}", route.id, route.user_id);
        self.events.publish(RouteEvent::RouteStarted {
            route_id: route.id,
            user_id: route.user_id,
        });

        Ok(ApiResponse::success_with_message(
            route.into(),
            "Ruta iniciada exitosamente".to_string(),
        ))
    }

    pub async fn complete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        request: CompleteRouteRequest,
    ) -> AppResult<ApiResponse<CompleteRouteResponse>> {
        let (route, pending_stops) = self
            .routes
            .complete(tenant_id, id, request.actual_distance)
            .await?;

        if pending_stops > 0 {
            info!(
                "Ruta {} completada con {} paradas pendientes",
                route.id, pending_stops
            );
        } else {
            info!("Ruta {} completada con todas las paradas resueltas", route.id);
        }

        self.events.publish(RouteEvent::RouteCompleted {
            route_id: route.id,
            user_id: route.user_id,
            pending_stops,
        });

        let message = if pending_stops > 0 {
            format!("Ruta completada con {} paradas sin resolver", pending_stops)
        } else {
            "Ruta completada exitosamente".to_string()
        };

        Ok(ApiResponse::success_with_message(
            CompleteRouteResponse {
                route: route.into(),
                pending_stops,
            },
            message,
        ))
    }

    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        request: CancelRouteRequest,
    ) -> AppResult<ApiResponse<RouteResponse>> {
        request.validate()?;

        let route = self.routes.cancel(tenant_id, id, request.reason).await?;

        info!("Ruta {} cancelada", route.id);
        self.events.publish(RouteEvent::RouteCancelled {
            route_id: route.id,
            user_id: route.user_id,
            reason: route.cancel_reason.clone(),
        });

        Ok(ApiResponse::success_with_message(
            route.into(),
            "Ruta cancelada".to_string(),
        ))
    }
}
