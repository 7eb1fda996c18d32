//! Endpoints del ciclo de vida de rutas

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::route_controller::RouteController;
use crate::dto::common::ApiResponse;
use crate::dto::route_dto::{
    CancelRouteRequest, CompleteRouteRequest, CompleteRouteResponse, CreateRouteRequest,
    RouteDetailResponse, RouteResponse, StartRouteRequest, UpdateRouteRequest,
};
use crate::middleware::actor::ActorContext;
use crate::models::route::RouteFilters;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_route_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_route).get(list_routes))
        .route("/:id", get(get_route).put(update_route))
        .route("/:id/start", post(start_route))
        .route("/:id/complete", post(complete_route))
        .route("/:id/cancel", post(cancel_route))
}

async fn create_route(
    State(state): State<AppState>,
    actor: ActorContext,
    Json(request): Json<CreateRouteRequest>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let controller = RouteController::new(state.pool.clone(), state.events.clone());
    let response = controller.create(actor.tenant_id, request).await?;
    Ok(Json(response))
}

async fn list_routes(
    State(state): State<AppState>,
    actor: ActorContext,
    Query(filters): Query<RouteFilters>,
) -> Result<Json<Vec<RouteResponse>>, AppError> {
    let controller = RouteController::new(state.pool.clone(), state.events.clone());
    let response = controller.list(actor.tenant_id, filters).await?;
    Ok(Json(response))
}

async fn get_route(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
) -> Result<Json<RouteDetailResponse>, AppError> {
    let controller = RouteController::new(state.pool.clone(), state.events.clone());
    let response = controller.get_detail(actor.tenant_id, id).await?;
    Ok(Json(response))
}

async fn update_route(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRouteRequest>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let controller = RouteController::new(state.pool.clone(), state.events.clone());
    let response = controller.update(actor.tenant_id, id, request).await?;
    Ok(Json(response))
}

async fn start_route(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    request: Option<Json<StartRouteRequest>>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = RouteController::new(state.pool.clone(), state.events.clone());
    let response = controller.start(actor.tenant_id, id, request).await?;
    Ok(Json(response))
}

async fn complete_route(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    request: Option<Json<CompleteRouteRequest>>,
) -> Result<Json<ApiResponse<CompleteRouteResponse>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = RouteController::new(state.pool.clone(), state.events.clone());
    let response = controller.complete(actor.tenant_id, id, request).await?;
    Ok(Json(response))
}

async fn cancel_route(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    request: Option<Json<CancelRouteRequest>>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = RouteController::new(state.pool.clone(), state.events.clone());
    let response = controller.cancel(actor.tenant_id, id, request).await?;
    Ok(Json(response))
}
