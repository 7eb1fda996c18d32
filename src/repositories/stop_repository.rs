//! Repositorio de paradas
//!
//! Dueño de la lista ordenada de paradas de una ruta. Los índices de
//! visita se mantienen contiguos 1..N tras toda alta, baja o
//! reordenamiento; el constraint UNIQUE diferido permite intercambiar
//! índices dentro de una sola transacción.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::stop_dto::AddStopRequest;
use crate::models::route::{Route, RouteStatus};
use crate::models::stop::{self, Stop, StopStatus};
use crate::repositories::route_repository::lock_route;
use crate::utils::errors::{invalid_transition, not_found_error, AppError, AppResult};

pub struct StopRepository {
    pool: PgPool,
}

impl StopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_route(&self, route_id: Uuid) -> AppResult<Vec<Stop>> {
        let stops = sqlx::query_as::<_, Stop>(
            "SELECT * FROM route_stops WHERE route_id = $1 ORDER BY visit_order",
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stops)
    }

    /// Alta de parada; solo con la ruta en borrador. Si no se indica
    /// posición se asigna la siguiente; si se indica, las paradas
    /// posteriores se corren una posición.
    pub async fn add(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        request: AddStopRequest,
    ) -> AppResult<Stop> {
        let mut tx = self.pool.begin().await?;

        let route = lock_route(&mut tx, tenant_id, route_id).await?;
        ensure_editable(route.status, route_id)?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM route_stops WHERE route_id = $1")
                .bind(route_id)
                .fetch_one(&mut *tx)
                .await?;

        let visit_order = match request.visit_order {
            None => count as i32 + 1,
            Some(order) => {
                if order < 1 || order as i64 > count + 1 {
                    return Err(AppError::BadRequest(format!(
                        "visit_order {} is out of range 1..={}",
                        order,
                        count + 1
                    )));
                }
                // Abrir hueco para la nueva posición
                sqlx::query(
                    "UPDATE route_stops SET visit_order = visit_order + 1
                     WHERE route_id = $1 AND visit_order >= $2",
                )
                .bind(route_id)
                .bind(order)
                .execute(&mut *tx)
                .await?;
                order
            }
        };

        let stop = sqlx::query_as::<_, Stop>(
            r#"
            INSERT INTO route_stops (id, route_id, client_id, visit_order, estimated_arrival,
                                     estimated_duration_minutes, distance_from_previous,
                                     notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(route_id)
        .bind(request.client_id)
        .bind(visit_order)
        .bind(request.estimated_arrival)
        .bind(request.estimated_duration_minutes)
        .bind(request.distance_from_previous)
        .bind(request.notes)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stop)
    }

    /// Baja de parada; solo en borrador. Compacta los índices restantes.
    pub async fn remove(&self, tenant_id: Uuid, route_id: Uuid, stop_id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let route = lock_route(&mut tx, tenant_id, route_id).await?;
        ensure_editable(route.status, route_id)?;

        let removed_order: Option<i32> = sqlx::query_scalar(
            "DELETE FROM route_stops WHERE id = $1 AND route_id = $2 RETURNING visit_order",
        )
        .bind(stop_id)
        .bind(route_id)
        .fetch_optional(&mut *tx)
        .await?;

        let removed_order =
            removed_order.ok_or_else(|| not_found_error("stop", &stop_id.to_string()))?;

        sqlx::query(
            "UPDATE route_stops SET visit_order = visit_order - 1
             WHERE route_id = $1 AND visit_order > $2",
        )
        .bind(route_id)
        .bind(removed_order)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Reordenamiento atómico: la lista debe ser permutación exacta de
    /// las paradas actuales; se reasignan los índices 1..N de una vez.
    pub async fn reorder(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        ordered_stop_ids: Vec<Uuid>,
    ) -> AppResult<Vec<Stop>> {
        let mut tx = self.pool.begin().await?;

        let route = lock_route(&mut tx, tenant_id, route_id).await?;
        ensure_editable(route.status, route_id)?;

        let current_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM route_stops WHERE route_id = $1")
                .bind(route_id)
                .fetch_all(&mut *tx)
                .await?;

        if !stop::is_permutation_of(&current_ids, &ordered_stop_ids) {
            return Err(AppError::InvalidStopSet(format!(
                "expected a permutation of the {} current stop ids of route '{}'",
                current_ids.len(),
                route_id
            )));
        }

        for (index, stop_id) in ordered_stop_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE route_stops SET visit_order = $3 WHERE id = $1 AND route_id = $2",
            )
            .bind(stop_id)
            .bind(route_id)
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await?;
        }

        let stops = sqlx::query_as::<_, Stop>(
            "SELECT * FROM route_stops WHERE route_id = $1 ORDER BY visit_order",
        )
        .bind(route_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stops)
    }

    /// Llegada a la parada. Exige ruta iniciada, parada pendiente y que
    /// ninguna parada de orden menor siga pendiente.
    pub async fn arrive(
        &self,
        tenant_id: Uuid,
        stop_id: Uuid,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> AppResult<Stop> {
        let mut tx = self.pool.begin().await?;

        let (route, stop) = lock_route_then_stop(&mut tx, tenant_id, stop_id).await?;

        if route.status != RouteStatus::Started {
            return Err(invalid_transition("route", route.status.as_str(), "stop arrival"));
        }
        if stop.status != StopStatus::Pending {
            return Err(invalid_transition("stop", stop.status.as_str(), "arrived"));
        }

        let siblings: Vec<(i32, StopStatus)> = sqlx::query_as(
            "SELECT visit_order, status FROM route_stops WHERE route_id = $1",
        )
        .bind(stop.route_id)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(order) = stop::first_blocking_order(&siblings, stop.visit_order) {
            return Err(AppError::OutOfSequence(format!(
                "stop at position {} is still pending; stop {} cannot be arrived",
                order, stop.visit_order
            )));
        }

        let stop = sqlx::query_as::<_, Stop>(
            r#"
            UPDATE route_stops
            SET status = 'arrived', actual_arrival = $2, arrival_lat = $3, arrival_lng = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(stop_id)
        .bind(Utc::now())
        .bind(lat)
        .bind(lng)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stop)
    }

    /// Salida de la parada; registra el enlace opcional a visita/pedido.
    pub async fn depart(
        &self,
        tenant_id: Uuid,
        stop_id: Uuid,
        visit_id: Option<Uuid>,
        order_id: Option<Uuid>,
        notes: Option<String>,
    ) -> AppResult<Stop> {
        let mut tx = self.pool.begin().await?;

        let (_route, stop) = lock_route_then_stop(&mut tx, tenant_id, stop_id).await?;
        if stop.status != StopStatus::Arrived {
            return Err(invalid_transition("stop", stop.status.as_str(), "departed"));
        }

        let stop = sqlx::query_as::<_, Stop>(
            r#"
            UPDATE route_stops
            SET status = 'departed', actual_departure = $2,
                visit_id = COALESCE($3, visit_id),
                order_id = COALESCE($4, order_id),
                notes = COALESCE($5, notes)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(stop_id)
        .bind(Utc::now())
        .bind(visit_id)
        .bind(order_id)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stop)
    }

    /// Salto de parada; el motivo ya viene validado como no vacío.
    pub async fn skip(&self, tenant_id: Uuid, stop_id: Uuid, reason: String) -> AppResult<Stop> {
        let mut tx = self.pool.begin().await?;

        let (route, stop) = lock_route_then_stop(&mut tx, tenant_id, stop_id).await?;

        if route.status != RouteStatus::Started {
            return Err(invalid_transition("route", route.status.as_str(), "stop skip"));
        }
        if stop.status != StopStatus::Pending {
            return Err(invalid_transition("stop", stop.status.as_str(), "skipped"));
        }

        let stop = sqlx::query_as::<_, Stop>(
            r#"
            UPDATE route_stops
            SET status = 'skipped', skip_reason = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(stop_id)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stop)
    }

    /// Parada actual: la de menor orden con llegada y sin salida.
    pub async fn current_stop(&self, route_id: Uuid) -> AppResult<Option<Stop>> {
        let stop = sqlx::query_as::<_, Stop>(
            "SELECT * FROM route_stops WHERE route_id = $1 AND status = 'arrived'
             ORDER BY visit_order LIMIT 1",
        )
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stop)
    }

    /// Próxima parada: la pendiente de menor orden.
    pub async fn next_stop(&self, route_id: Uuid) -> AppResult<Option<Stop>> {
        let stop = sqlx::query_as::<_, Stop>(
            "SELECT * FROM route_stops WHERE route_id = $1 AND status = 'pending'
             ORDER BY visit_order LIMIT 1",
        )
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stop)
    }
}

/// Candados de ruta y parada en orden fijo: siempre primero la ruta y
/// después la parada, el mismo orden que usan las ediciones en borrador.
/// Un orden cruzado podría abrazarse con `add`/`remove`/`reorder`.
async fn lock_route_then_stop(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    stop_id: Uuid,
) -> AppResult<(Route, Stop)> {
    // Lectura sin candado solo para resolver la ruta; route_id es inmutable.
    let route_id: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT s.route_id FROM route_stops s
        JOIN routes r ON r.id = s.route_id
        WHERE s.id = $1 AND r.tenant_id = $2
        "#,
    )
    .bind(stop_id)
    .bind(tenant_id)
    .fetch_optional(&mut *conn)
    .await?;

    let route_id = route_id.ok_or_else(|| not_found_error("stop", &stop_id.to_string()))?;
    let route = lock_route(&mut *conn, tenant_id, route_id).await?;

    let stop = sqlx::query_as::<_, Stop>(
        "SELECT * FROM route_stops WHERE id = $1 AND route_id = $2 FOR UPDATE",
    )
    .bind(stop_id)
    .bind(route_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| not_found_error("stop", &stop_id.to_string()))?;

    Ok((route, stop))
}

fn ensure_editable(status: RouteStatus, route_id: Uuid) -> AppResult<()> {
    if !status.is_editable() {
        return Err(AppError::RouteNotEditable(format!(
            "route '{}' is in status '{}'",
            route_id,
            status.as_str()
        )));
    }
    Ok(())
}
