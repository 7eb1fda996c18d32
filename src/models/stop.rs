//! Modelo de Stop
//!
//! Una parada es una visita planificada dentro de una ruta. Las paradas
//! se ejecutan estrictamente de adelante hacia atrás: ninguna parada
//! puede marcarse como llegada mientras exista una parada anterior
//! todavía pendiente.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::collections::HashSet;
use uuid::Uuid;

/// Estado de la parada - mapea al ENUM stop_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "stop_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StopStatus {
    Pending,
    Arrived,
    Departed,
    Skipped,
}

impl StopStatus {
    /// Una parada resuelta ya no bloquea la secuencia.
    pub fn is_resolved(self) -> bool {
        !matches!(self, StopStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StopStatus::Pending => "pending",
            StopStatus::Arrived => "arrived",
            StopStatus::Departed => "departed",
            StopStatus::Skipped => "skipped",
        }
    }
}

/// Stop principal - mapea exactamente a la tabla route_stops
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Stop {
    pub id: Uuid,
    pub route_id: Uuid,
    pub client_id: Uuid,
    pub visit_order: i32,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub estimated_duration_minutes: Option<i32>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub status: StopStatus,
    pub visit_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub notes: Option<String>,
    pub skip_reason: Option<String>,
    pub distance_from_previous: Option<Decimal>,
    pub arrival_lat: Option<f64>,
    pub arrival_lng: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Verifica la regla de secuenciación: la parada con `target_order` solo
/// puede recibir llegada si ninguna parada de orden menor sigue pendiente.
/// Devuelve el orden de la primera parada que bloquea, si existe.
pub fn first_blocking_order(stops: &[(i32, StopStatus)], target_order: i32) -> Option<i32> {
    stops
        .iter()
        .filter(|(order, status)| *order < target_order && !status.is_resolved())
        .map(|(order, _)| *order)
        .min()
}

/// Valida que la lista propuesta para reordenar sea una permutación
/// exacta de las paradas actuales de la ruta (sin faltantes, sobrantes
/// ni duplicados).
pub fn is_permutation_of(current: &[Uuid], proposed: &[Uuid]) -> bool {
    if current.len() != proposed.len() {
        return false;
    }
    let proposed_set: HashSet<&Uuid> = proposed.iter().collect();
    if proposed_set.len() != proposed.len() {
        return false;
    }
    current.iter().all(|id| proposed_set.contains(id))
}

/// Verifica que los índices de orden formen la secuencia contigua 1..N.
pub fn orders_are_contiguous(orders: &[i32]) -> bool {
    let mut sorted = orders.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(i, order)| *order == (i as i32) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llegada_fuera_de_secuencia_bloqueada() {
        // Escenario: 3 paradas, la 1 sigue pendiente, se intenta llegar a la 3
        let stops = vec![
            (1, StopStatus::Pending),
            (2, StopStatus::Pending),
            (3, StopStatus::Pending),
        ];
        assert_eq!(first_blocking_order(&stops, 3), Some(1));
        assert_eq!(first_blocking_order(&stops, 2), Some(1));
        assert_eq!(first_blocking_order(&stops, 1), None);
    }

    #[test]
    fn test_paradas_resueltas_no_bloquean() {
        // Una parada llegada-pero-no-salida no bloquea a las siguientes
        let stops = vec![
            (1, StopStatus::Arrived),
            (2, StopStatus::Skipped),
            (3, StopStatus::Departed),
            (4, StopStatus::Pending),
        ];
        assert_eq!(first_blocking_order(&stops, 4), None);
        assert_eq!(first_blocking_order(&stops, 5), Some(4));
    }

    #[test]
    fn test_bloqueo_en_toda_permutacion() {
        // La secuenciación se cumple para todo intento fuera de orden:
        // si alguna parada menor está pendiente, el intento se bloquea.
        let estados = [
            StopStatus::Pending,
            StopStatus::Arrived,
            StopStatus::Departed,
            StopStatus::Skipped,
        ];
        for a in estados {
            for b in estados {
                let stops = vec![(1, a), (2, b), (3, StopStatus::Pending)];
                let esperado = [(1, a), (2, b)]
                    .iter()
                    .filter(|(_, s)| !s.is_resolved())
                    .map(|(o, _)| *o)
                    .min();
                assert_eq!(first_blocking_order(&stops, 3), esperado);
            }
        }
    }

    #[test]
    fn test_permutacion_valida() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert!(is_permutation_of(&[a, b, c], &[c, a, b]));
        assert!(is_permutation_of(&[], &[]));
    }

    #[test]
    fn test_permutacion_con_faltante_rechazada() {
        // Escenario: reordenar omitiendo una parada existente
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert!(!is_permutation_of(&[a, b, c], &[a, b]));
        assert!(!is_permutation_of(&[a, b, c], &[a, b, Uuid::new_v4()]));
        assert!(!is_permutation_of(&[a, b, c], &[a, b, b]));
    }

    #[test]
    fn test_ordenes_contiguos() {
        assert!(orders_are_contiguous(&[1, 2, 3]));
        assert!(orders_are_contiguous(&[3, 1, 2]));
        assert!(orders_are_contiguous(&[]));
        assert!(!orders_are_contiguous(&[1, 3, 4]));
        assert!(!orders_are_contiguous(&[0, 1, 2]));
        assert!(!orders_are_contiguous(&[1, 2, 2]));
    }
}
