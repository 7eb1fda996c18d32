//! Controlador del libro de paradas

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::stop_dto::{
    AddStopRequest, ArriveStopRequest, DepartStopRequest, ReorderStopsRequest, SkipStopRequest,
};
use crate::models::stop::Stop;
use crate::repositories::stop_repository::StopRepository;
use crate::utils::errors::AppResult;

pub struct StopController {
    stops: StopRepository,
}

impl StopController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            stops: StopRepository::new(pool),
        }
    }

    pub async fn add(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        request: AddStopRequest,
    ) -> AppResult<ApiResponse<Stop>> {
        request.validate()?;

        let stop = self.stops.add(tenant_id, route_id, request).await?;
        info!(
            "Parada {} agregada a la ruta {} en la posición {}",
            stop.id, route_id, stop.visit_order
        );

        Ok(ApiResponse::success_with_message(
            stop,
            "Parada agregada exitosamente".to_string(),
        ))
    }

    pub async fn remove(&self, tenant_id: Uuid, route_id: Uuid, stop_id: Uuid) -> AppResult<()> {
        self.stops.remove(tenant_id, route_id, stop_id).await?;
        info!("Parada {} eliminada de la ruta {}", stop_id, route_id);
        Ok(())
    }

    pub async fn reorder(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        request: ReorderStopsRequest,
    ) -> AppResult<ApiResponse<Vec<Stop>>> {
        let stops = self
            .stops
            .reorder(tenant_id, route_id, request.stop_ids)
            .await?;

        info!("Ruta {} reordenada ({} paradas)", route_id, stops.len());
        Ok(ApiResponse::success_with_message(
            stops,
            "Paradas reordenadas exitosamente".to_string(),
        ))
    }

    pub async fn arrive(
        &self,
        tenant_id: Uuid,
        stop_id: Uuid,
        request: ArriveStopRequest,
    ) -> AppResult<ApiResponse<Stop>> {
        let stop = self
            .stops
            .arrive(tenant_id, stop_id, request.lat, request.lng)
            .await?;

        info!(
            "Llegada registrada en la parada {} (posición {})",
            stop.id, stop.visit_order
        );
        Ok(ApiResponse::success(stop))
    }

    pub async fn depart(
        &self,
        tenant_id: Uuid,
        stop_id: Uuid,
        request: DepartStopRequest,
    ) -> AppResult<ApiResponse<Stop>> {
        request.validate()?;

        let stop = self
            .stops
            .depart(
                tenant_id,
                stop_id,
                request.visit_id,
                request.order_id,
                request.notes,
            )
            .await?;

        info!("Salida registrada en la parada {}", stop.id);
        Ok(ApiResponse::success(stop))
    }

    pub async fn skip(
        &self,
        tenant_id: Uuid,
        stop_id: Uuid,
        request: SkipStopRequest,
    ) -> AppResult<ApiResponse<Stop>> {
        request.validate()?;

        let stop = self.stops.skip(tenant_id, stop_id, request.reason).await?;
        info!("Parada {} saltada", stop.id);
        Ok(ApiResponse::success(stop))
    }

    /// Parada actual de la ruta; `data: null` cuando no hay ninguna.
    pub async fn current_stop(&self, route_id: Uuid) -> AppResult<ApiResponse<Stop>> {
        match self.stops.current_stop(route_id).await? {
            Some(stop) => Ok(ApiResponse::success(stop)),
            None => Ok(ApiResponse::empty()),
        }
    }

    /// Próxima parada pendiente; `data: null` cuando no queda ninguna.
    pub async fn next_stop(&self, route_id: Uuid) -> AppResult<ApiResponse<Stop>> {
        match self.stops.next_stop(route_id).await? {
            Some(stop) => Ok(ApiResponse::success(stop)),
            None => Ok(ApiResponse::empty()),
        }
    }
}
