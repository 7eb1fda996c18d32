//! Repositorio de rutas
//!
//! Dueño del ciclo de vida de la ruta. Las transiciones toman el
//! candado de fila (`FOR UPDATE`) antes de verificar precondiciones,
//! de modo que dos llamadas en carrera se serializan y la perdedora
//! observa el estado ya cambiado.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::dto::route_dto::{CreateRouteRequest, UpdateRouteRequest};
use crate::models::route::{Route, RouteFilters, RouteStatus};
use crate::utils::errors::{invalid_transition, not_found_error, AppError, AppResult};

pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        request: CreateRouteRequest,
    ) -> AppResult<Route> {
        let route = sqlx::query_as::<_, Route>(
            r#"
            INSERT INTO routes (id, tenant_id, user_id, zone_id, name, route_date,
                                estimated_start_time, estimated_end_time, estimated_distance,
                                notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(request.user_id)
        .bind(request.zone_id)
        .bind(request.name)
        .bind(request.route_date)
        .bind(request.estimated_start_time)
        .bind(request.estimated_end_time)
        .bind(request.estimated_distance)
        .bind(request.notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(route)
    }

    pub async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Route>> {
        let route = sqlx::query_as::<_, Route>(
            "SELECT * FROM routes WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(route)
    }

    pub async fn list(&self, tenant_id: Uuid, filters: RouteFilters) -> AppResult<Vec<Route>> {
        let mut query = QueryBuilder::new("SELECT * FROM routes WHERE tenant_id = ");
        query.push_bind(tenant_id);

        if let Some(status) = filters.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(user_id) = filters.user_id {
            query.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(from) = filters.from {
            query.push(" AND route_date >= ").push_bind(from);
        }
        if let Some(to) = filters.to {
            query.push(" AND route_date <= ").push_bind(to);
        }

        query.push(" ORDER BY route_date DESC, created_at DESC");
        query
            .push(" LIMIT ")
            .push_bind(filters.limit.unwrap_or(100).clamp(1, 500));
        query
            .push(" OFFSET ")
            .push_bind(filters.offset.unwrap_or(0).max(0));

        let routes = query
            .build_query_as::<Route>()
            .fetch_all(&self.pool)
            .await?;

        Ok(routes)
    }

    /// Editar campos de planificación; solo en borrador.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        request: UpdateRouteRequest,
    ) -> AppResult<Route> {
        let mut tx = self.pool.begin().await?;

        let current = lock_route(&mut tx, tenant_id, id).await?;
        if !current.status.is_editable() {
            return Err(AppError::RouteNotEditable(format!(
                "route '{}' is in status '{}'",
                id,
                current.status.as_str()
            )));
        }

        let route = sqlx::query_as::<_, Route>(
            r#"
            UPDATE routes
            SET zone_id = $3, name = $4, route_date = $5,
                estimated_start_time = $6, estimated_end_time = $7,
                estimated_distance = $8, notes = $9
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(request.zone_id.or(current.zone_id))
        .bind(request.name.unwrap_or(current.name))
        .bind(request.route_date.unwrap_or(current.route_date))
        .bind(request.estimated_start_time.or(current.estimated_start_time))
        .bind(request.estimated_end_time.or(current.estimated_end_time))
        .bind(request.estimated_distance.or(current.estimated_distance))
        .bind(request.notes.or(current.notes))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(route)
    }

    /// Draft -> Started. Requiere al menos una parada.
    pub async fn start(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        start_lat: Option<f64>,
        start_lng: Option<f64>,
    ) -> AppResult<Route> {
        let mut tx = self.pool.begin().await?;

        let current = lock_route(&mut tx, tenant_id, id).await?;

        let stop_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM route_stops WHERE route_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        check_startable(current.status, stop_count)?;

        let route = sqlx::query_as::<_, Route>(
            r#"
            UPDATE routes
            SET status = 'started', actual_start_time = $3, start_lat = $4, start_lng = $5
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(Utc::now())
        .bind(start_lat)
        .bind(start_lng)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(route)
    }

    /// Started -> Completed. Las paradas pendientes no bloquean: se
    /// devuelve su número para que el caller lo reporte.
    pub async fn complete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        actual_distance: Option<Decimal>,
    ) -> AppResult<(Route, i64)> {
        let mut tx = self.pool.begin().await?;

        let current = lock_route(&mut tx, tenant_id, id).await?;
        if !current.status.can_transition(RouteStatus::Completed) {
            return Err(invalid_transition(
                "route",
                current.status.as_str(),
                RouteStatus::Completed.as_str(),
            ));
        }

        let pending_stops: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM route_stops WHERE route_id = $1 AND status = 'pending'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let route = sqlx::query_as::<_, Route>(
            r#"
            UPDATE routes
            SET status = 'completed', actual_end_time = $3, actual_distance = $4
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(Utc::now())
        .bind(actual_distance)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((route, pending_stops))
    }

    /// Draft|Started -> Cancelled.
    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Route> {
        let mut tx = self.pool.begin().await?;

        let current = lock_route(&mut tx, tenant_id, id).await?;
        if !current.status.can_transition(RouteStatus::Cancelled) {
            return Err(invalid_transition(
                "route",
                current.status.as_str(),
                RouteStatus::Cancelled.as_str(),
            ));
        }

        let route = sqlx::query_as::<_, Route>(
            r#"
            UPDATE routes
            SET status = 'cancelled', cancel_reason = $3
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(route)
    }
}

/// Precondiciones de `start`: la ruta debe poder pasar a iniciada y
/// tener al menos una parada. Se rechaza antes de escribir nada.
fn check_startable(status: RouteStatus, stop_count: i64) -> AppResult<()> {
    if !status.can_transition(RouteStatus::Started) {
        return Err(invalid_transition(
            "route",
            status.as_str(),
            RouteStatus::Started.as_str(),
        ));
    }
    if stop_count == 0 {
        return Err(AppError::EmptyRoute);
    }
    Ok(())
}

/// Toma el candado de la fila de la ruta dentro de la transacción.
pub(crate) async fn lock_route(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    id: Uuid,
) -> AppResult<Route> {
    sqlx::query_as::<_, Route>(
        "SELECT * FROM routes WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| not_found_error("route", &id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iniciar_requiere_paradas() {
        let err = check_startable(RouteStatus::Draft, 0).unwrap_err();
        assert!(matches!(err, AppError::EmptyRoute));
        assert_eq!(err.code(), "EMPTY_ROUTE");

        assert!(check_startable(RouteStatus::Draft, 1).is_ok());
        assert!(check_startable(RouteStatus::Draft, 12).is_ok());
    }

    #[test]
    fn test_iniciar_solo_desde_borrador() {
        for status in [
            RouteStatus::Started,
            RouteStatus::Completed,
            RouteStatus::Cancelled,
        ] {
            let err = check_startable(status, 5).unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition(_)));
        }
    }
}
