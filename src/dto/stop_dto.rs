//! DTOs del libro de paradas

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_not_empty;

/// Request para agregar una parada (solo con ruta en borrador)
#[derive(Debug, Deserialize, Validate)]
pub struct AddStopRequest {
    pub client_id: Uuid,

    /// Posición deseada 1..=N+1; si se omite se asigna la siguiente.
    #[validate(range(min = 1))]
    pub visit_order: Option<i32>,

    pub estimated_arrival: Option<DateTime<Utc>>,

    #[validate(range(min = 0))]
    pub estimated_duration_minutes: Option<i32>,

    pub distance_from_previous: Option<Decimal>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Request para reordenar: permutación exacta de las paradas actuales
#[derive(Debug, Deserialize)]
pub struct ReorderStopsRequest {
    pub stop_ids: Vec<Uuid>,
}

/// Request de llegada a parada
#[derive(Debug, Default, Deserialize)]
pub struct ArriveStopRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Request de salida de parada
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DepartStopRequest {
    pub visit_id: Option<Uuid>,
    pub order_id: Option<Uuid>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Request para saltar una parada; el motivo es obligatorio
#[derive(Debug, Deserialize, Validate)]
pub struct SkipStopRequest {
    #[validate(custom = "validate_not_empty")]
    pub reason: String,
}
