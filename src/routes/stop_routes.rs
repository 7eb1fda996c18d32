//! Endpoints del libro de paradas
//!
//! Las altas, bajas y reordenamientos viven bajo /api/routes/:id; las
//! acciones de ejecución (llegada, salida, salto) bajo /api/stops/:id.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::stop_controller::StopController;
use crate::dto::common::ApiResponse;
use crate::dto::stop_dto::{
    AddStopRequest, ArriveStopRequest, DepartStopRequest, ReorderStopsRequest, SkipStopRequest,
};
use crate::middleware::actor::ActorContext;
use crate::models::stop::Stop;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_route_stops_router() -> Router<AppState> {
    Router::new()
        .route("/:id/stops", post(add_stop))
        .route("/:id/stops/:stop_id", delete(remove_stop))
        .route("/:id/stops/reorder", post(reorder_stops))
        .route("/:id/current-stop", get(current_stop))
        .route("/:id/next-stop", get(next_stop))
}

pub fn create_stop_actions_router() -> Router<AppState> {
    Router::new()
        .route("/:id/arrive", post(arrive_stop))
        .route("/:id/depart", post(depart_stop))
        .route("/:id/skip", post(skip_stop))
}

async fn add_stop(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
    Json(request): Json<AddStopRequest>,
) -> Result<Json<ApiResponse<Stop>>, AppError> {
    let controller = StopController::new(state.pool.clone());
    let response = controller.add(actor.tenant_id, route_id, request).await?;
    Ok(Json(response))
}

async fn remove_stop(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((route_id, stop_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = StopController::new(state.pool.clone());
    controller.remove(actor.tenant_id, route_id, stop_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Parada eliminada exitosamente"
    })))
}

async fn reorder_stops(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
    Json(request): Json<ReorderStopsRequest>,
) -> Result<Json<ApiResponse<Vec<Stop>>>, AppError> {
    let controller = StopController::new(state.pool.clone());
    let response = controller.reorder(actor.tenant_id, route_id, request).await?;
    Ok(Json(response))
}

async fn current_stop(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(route_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Stop>>, AppError> {
    let controller = StopController::new(state.pool.clone());
    let response = controller.current_stop(route_id).await?;
    Ok(Json(response))
}

async fn next_stop(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(route_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Stop>>, AppError> {
    let controller = StopController::new(state.pool.clone());
    let response = controller.next_stop(route_id).await?;
    Ok(Json(response))
}

async fn arrive_stop(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(stop_id): Path<Uuid>,
    request: Option<Json<ArriveStopRequest>>,
) -> Result<Json<ApiResponse<Stop>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = StopController::new(state.pool.clone());
    let response = controller.arrive(actor.tenant_id, stop_id, request).await?;
    Ok(Json(response))
}

async fn depart_stop(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(stop_id): Path<Uuid>,
    request: Option<Json<DepartStopRequest>>,
) -> Result<Json<ApiResponse<Stop>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let controller = StopController::new(state.pool.clone());
    let response = controller.depart(actor.tenant_id, stop_id, request).await?;
    Ok(Json(response))
}

async fn skip_stop(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(stop_id): Path<Uuid>,
    Json(request): Json<SkipStopRequest>,
) -> Result<Json<ApiResponse<Stop>>, AppError> {
    let controller = StopController::new(state.pool.clone());
    let response = controller.skip(actor.tenant_id, stop_id, request).await?;
    Ok(Json(response))
}
