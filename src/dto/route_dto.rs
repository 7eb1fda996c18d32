//! DTOs del ciclo de vida de rutas

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::load::LoadProduct;
use crate::models::route::{Route, RouteStatus};
use crate::models::stop::Stop;

/// Request para crear una ruta (borrador)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRouteRequest {
    /// Vendedor asignado a la ruta.
    pub user_id: Uuid,

    pub zone_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    pub route_date: NaiveDate,

    pub estimated_start_time: Option<DateTime<Utc>>,
    pub estimated_end_time: Option<DateTime<Utc>>,
    pub estimated_distance: Option<Decimal>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Request para editar los campos de planificación (solo en borrador)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRouteRequest {
    pub zone_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    pub route_date: Option<NaiveDate>,
    pub estimated_start_time: Option<DateTime<Utc>>,
    pub estimated_end_time: Option<DateTime<Utc>>,
    pub estimated_distance: Option<Decimal>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Request para iniciar una ruta
#[derive(Debug, Default, Deserialize)]
pub struct StartRouteRequest {
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
}

/// Request para completar una ruta
#[derive(Debug, Default, Deserialize)]
pub struct CompleteRouteRequest {
    pub actual_distance: Option<Decimal>,
}

/// Request para cancelar una ruta
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelRouteRequest {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

/// Response de ruta para la API
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub zone_id: Option<Uuid>,
    pub name: String,
    pub route_date: NaiveDate,
    pub status: RouteStatus,
    pub estimated_start_time: Option<DateTime<Utc>>,
    pub estimated_end_time: Option<DateTime<Utc>>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub estimated_distance: Option<Decimal>,
    pub actual_distance: Option<Decimal>,
    pub notes: Option<String>,
    pub cancel_reason: Option<String>,
    pub load_finalized: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Route> for RouteResponse {
    fn from(route: Route) -> Self {
        Self {
            id: route.id,
            user_id: route.user_id,
            zone_id: route.zone_id,
            name: route.name,
            route_date: route.route_date,
            status: route.status,
            estimated_start_time: route.estimated_start_time,
            estimated_end_time: route.estimated_end_time,
            actual_start_time: route.actual_start_time,
            actual_end_time: route.actual_end_time,
            estimated_distance: route.estimated_distance,
            actual_distance: route.actual_distance,
            notes: route.notes,
            cancel_reason: route.cancel_reason,
            load_finalized: route.load_finalized,
            created_at: route.created_at,
        }
    }
}

/// Detalle completo: ruta + paradas + carga
#[derive(Debug, Serialize)]
pub struct RouteDetailResponse {
    #[serde(flatten)]
    pub route: RouteResponse,
    pub stops: Vec<Stop>,
    pub load_products: Vec<LoadProduct>,
    pub load_order_ids: Vec<Uuid>,
}

/// Response de completar ruta: las paradas sin resolver no bloquean,
/// se reportan al caller.
#[derive(Debug, Serialize)]
pub struct CompleteRouteResponse {
    #[serde(flatten)]
    pub route: RouteResponse,
    pub pending_stops: i64,
}
