//! Eventos de dominio
//!
//! El motor no llama a notificaciones, facturación ni almacenamiento:
//! emite eventos en un canal broadcast y los suscriptores externos
//! reaccionan. Que no haya suscriptores es un estado válido.

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteEvent {
    RouteStarted {
        route_id: Uuid,
        user_id: Uuid,
    },
    RouteCompleted {
        route_id: Uuid,
        user_id: Uuid,
        /// Paradas que quedaron pendientes: reportable, no bloqueante.
        pending_stops: i64,
    },
    RouteCancelled {
        route_id: Uuid,
        user_id: Uuid,
        reason: Option<String>,
    },
    RouteClosed {
        route_id: Uuid,
        monto_recibido: Decimal,
        diferencia: Decimal,
    },
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RouteEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publica el evento; sin suscriptores el envío simplemente se descarta.
    pub fn publish(&self, event: RouteEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RouteEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publicar_y_recibir() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let route_id = Uuid::new_v4();
        bus.publish(RouteEvent::RouteStarted {
            route_id,
            user_id: Uuid::new_v4(),
        });

        match rx.recv().await.unwrap() {
            RouteEvent::RouteStarted { route_id: id, .. } => assert_eq!(id, route_id),
            other => panic!("evento inesperado: {:?}", other),
        }
    }

    #[test]
    fn test_publicar_sin_suscriptores_no_falla() {
        let bus = EventBus::new(8);
        bus.publish(RouteEvent::RouteClosed {
            route_id: Uuid::new_v4(),
            monto_recibido: Decimal::ZERO,
            diferencia: Decimal::ZERO,
        });
    }
}
