//! Routers de la API
//!
//! Un router por recurso, anidados bajo /api.

pub mod closing_routes;
pub mod load_routes;
pub mod route_routes;
pub mod stop_routes;

use axum::Router;

use crate::state::AppState;

/// Router principal de la API del motor
pub fn create_api_router() -> Router<AppState> {
    let routes = route_routes::create_route_router()
        .merge(stop_routes::create_route_stops_router())
        .merge(load_routes::create_load_router())
        .merge(closing_routes::create_closing_router());

    Router::new()
        .nest("/api/routes", routes)
        .nest("/api/stops", stop_routes::create_stop_actions_router())
}
