//! Modelo de Route
//!
//! Este módulo contiene el struct Route, su máquina de estados y los
//! filtros de búsqueda. Mapea exactamente al schema PostgreSQL.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la ruta - mapea al ENUM route_status
///
/// Las transiciones son monótonas: una ruta nunca vuelve a un estado
/// anterior ni sale de `Completed`/`Cancelled`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "route_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Draft,
    Started,
    Completed,
    Cancelled,
}

impl RouteStatus {
    /// Tabla de transiciones explícita de la máquina de estados.
    pub fn can_transition(self, to: RouteStatus) -> bool {
        use RouteStatus::*;
        matches!(
            (self, to),
            (Draft, Started) | (Started, Completed) | (Draft, Cancelled) | (Started, Cancelled)
        )
    }

    /// Una ruta solo es editable (paradas, carga) en borrador.
    pub fn is_editable(self) -> bool {
        matches!(self, RouteStatus::Draft)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteStatus::Draft => "draft",
            RouteStatus::Started => "started",
            RouteStatus::Completed => "completed",
            RouteStatus::Cancelled => "cancelled",
        }
    }
}

/// Route principal - mapea exactamente a la tabla routes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Route {
    pub id: Uuid,
    pub tenant_id: Uuid,
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
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub notes: Option<String>,
    pub cancel_reason: Option<String>,
    pub caja_inicial: Decimal,
    pub caja_inicial_comment: Option<String>,
    pub load_finalized: bool,
    pub created_at: DateTime<Utc>,
}

/// Filtros para búsqueda de rutas
#[derive(Debug, Default, Deserialize)]
pub struct RouteFilters {
    pub status: Option<RouteStatus>,
    pub user_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RouteStatus; 4] = [
        RouteStatus::Draft,
        RouteStatus::Started,
        RouteStatus::Completed,
        RouteStatus::Cancelled,
    ];

    #[test]
    fn test_transiciones_validas() {
        assert!(RouteStatus::Draft.can_transition(RouteStatus::Started));
        assert!(RouteStatus::Started.can_transition(RouteStatus::Completed));
        assert!(RouteStatus::Draft.can_transition(RouteStatus::Cancelled));
        assert!(RouteStatus::Started.can_transition(RouteStatus::Cancelled));
    }

    #[test]
    fn test_matriz_de_transiciones_exhaustiva() {
        // Toda combinación (estado, destino) fuera de la tabla se rechaza
        for from in ALL {
            for to in ALL {
                let permitida = matches!(
                    (from, to),
                    (RouteStatus::Draft, RouteStatus::Started)
                        | (RouteStatus::Started, RouteStatus::Completed)
                        | (RouteStatus::Draft, RouteStatus::Cancelled)
                        | (RouteStatus::Started, RouteStatus::Cancelled)
                );
                assert_eq!(
                    from.can_transition(to),
                    permitida,
                    "transición {:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_estados_terminales() {
        for to in ALL {
            assert!(!RouteStatus::Completed.can_transition(to));
            assert!(!RouteStatus::Cancelled.can_transition(to));
        }
    }

    #[test]
    fn test_solo_draft_es_editable() {
        assert!(RouteStatus::Draft.is_editable());
        assert!(!RouteStatus::Started.is_editable());
        assert!(!RouteStatus::Completed.is_editable());
        assert!(!RouteStatus::Cancelled.is_editable());
    }
}
