//! Endpoints de cierre de ruta

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::closing_controller::ClosingController;
use crate::dto::closing_dto::{CloseRouteRequest, UpdateReturnLineRequest};
use crate::dto::common::ApiResponse;
use crate::middleware::actor::ActorContext;
use crate::models::closing::{ClosingSummary, ReturnLine, RouteClosing};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_closing_router() -> Router<AppState> {
    Router::new()
        .route("/:id/closing/returns", get(get_return_lines))
        .route("/:id/closing/returns/:product_id", patch(update_return_line))
        .route("/:id/closing/summary", get(get_summary))
        .route("/:id/closing/close", post(close_route))
}

async fn get_return_lines(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
) -> Result<Json<Vec<ReturnLine>>, AppError> {
    let controller = ClosingController::new(state.pool.clone(), state.events.clone());
    let response = controller.return_lines(actor.tenant_id, route_id).await?;
    Ok(Json(response))
}

async fn update_return_line(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((route_id, product_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateReturnLineRequest>,
) -> Result<Json<ApiResponse<ReturnLine>>, AppError> {
    let controller = ClosingController::new(state.pool.clone(), state.events.clone());
    let response = controller
        .update_return_line(actor.tenant_id, route_id, product_id, request)
        .await?;
    Ok(Json(response))
}

async fn get_summary(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
) -> Result<Json<ClosingSummary>, AppError> {
    let controller = ClosingController::new(state.pool.clone(), state.events.clone());
    let response = controller.summary(actor.tenant_id, route_id).await?;
    Ok(Json(response))
}

async fn close_route(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(route_id): Path<Uuid>,
    Json(request): Json<CloseRouteRequest>,
) -> Result<Json<ApiResponse<RouteClosing>>, AppError> {
    let controller = ClosingController::new(state.pool.clone(), state.events.clone());
    let response = controller
        .close(actor.tenant_id, route_id, actor.user_id, request)
        .await?;
    Ok(Json(response))
}
