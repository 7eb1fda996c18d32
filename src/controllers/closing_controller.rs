//! Controlador de cierre de ruta

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::closing_dto::{CloseRouteRequest, UpdateReturnLineRequest};
use crate::dto::common::ApiResponse;
use crate::events::{EventBus, RouteEvent};
use crate::models::closing::{ClosingSummary, ReturnLine, RouteClosing};
use crate::repositories::closing_repository::ClosingRepository;
use crate::utils::errors::AppResult;

pub struct ClosingController {
    closing: ClosingRepository,
    events: EventBus,
}

impl ClosingController {
    pub fn new(pool: PgPool, events: EventBus) -> Self {
        Self {
            closing: ClosingRepository::new(pool),
            events,
        }
    }

    pub async fn return_lines(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
    ) -> AppResult<Vec<ReturnLine>> {
        self.closing.return_lines(tenant_id, route_id).await
    }

    pub async fn update_return_line(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        product_id: Uuid,
        request: UpdateReturnLineRequest,
    ) -> AppResult<ApiResponse<ReturnLine>> {
        request.validate()?;

        let line = self
            .closing
            .update_return_line(
                tenant_id,
                route_id,
                product_id,
                request.mermas,
                request.rec_almacen,
                request.carga_vehiculo,
            )
            .await?;

        if line.diferencia != 0 {
            // Discrepancia reportable; el cierre no la bloquea
            info!(
                "Línea de retorno de {} en la ruta {} con diferencia {}",
                product_id, route_id, line.diferencia
            );
        }

        Ok(ApiResponse::success(line))
    }

    pub async fn summary(&self, tenant_id: Uuid, route_id: Uuid) -> AppResult<ClosingSummary> {
        self.closing.closing_summary(tenant_id, route_id).await
    }

    pub async fn close(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        closed_by: Uuid,
        request: CloseRouteRequest,
    ) -> AppResult<ApiResponse<RouteClosing>> {
        request.validate()?;

        let closing = self
            .closing
            .close(
                tenant_id,
                route_id,
                request.monto_recibido,
                request.return_corrections,
                closed_by,
            )
            .await?;

        info!(
            "Ruta {} cerrada: esperado {}, recibido {}, diferencia {}",
            route_id, closing.a_recibir, closing.monto_recibido, closing.diferencia
        );

        self.events.publish(RouteEvent::RouteClosed {
            route_id,
            monto_recibido: closing.monto_recibido,
            diferencia: closing.diferencia,
        });

        Ok(ApiResponse::success_with_message(
            closing,
            "Ruta cerrada exitosamente".to_string(),
        ))
    }
}
