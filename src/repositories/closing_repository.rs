//! Repositorio de cierre de ruta
//!
//! Dueño de las líneas de retorno y del registro de cierre. El cierre
//! solo corre sobre rutas completadas; el registro es inmutable y su
//! primary key sobre route_id garantiza que una ruta no se re-cierra.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::closing_dto::ReturnCorrection;
use crate::models::closing::{ClosingSummary, ReturnLine, RouteClosing};
use crate::models::route::{Route, RouteStatus};
use crate::repositories::activity_repository::{product_activity_in, transaction_totals_in};
use crate::repositories::route_repository::lock_route;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct ClosingRepository {
    pool: PgPool,
}

impl ClosingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_closing(&self, route_id: Uuid) -> AppResult<Option<RouteClosing>> {
        let closing = sqlx::query_as::<_, RouteClosing>(
            "SELECT * FROM route_closings WHERE route_id = $1",
        )
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(closing)
    }

    /// Líneas de retorno de la ruta. Mientras la ruta no esté cerrada,
    /// cada consulta refresca las entradas de solo lectura (carga,
    /// vendidos, entregados, devueltos) preservando lo capturado por el
    /// operador; tras el cierre devuelve las líneas congeladas.
    pub async fn return_lines(&self, tenant_id: Uuid, route_id: Uuid) -> AppResult<Vec<ReturnLine>> {
        let mut tx = self.pool.begin().await?;

        let route = lock_route(&mut tx, tenant_id, route_id).await?;
        ensure_completed(&route)?;

        let already_closed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM route_closings WHERE route_id = $1)",
        )
        .bind(route_id)
        .fetch_one(&mut *tx)
        .await?;

        if !already_closed {
            refresh_return_lines_in(&mut tx, route_id).await?;
        }

        let lines = sqlx::query_as::<_, ReturnLine>(
            "SELECT * FROM route_returns WHERE route_id = $1 ORDER BY product_id",
        )
        .bind(route_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(lines)
    }

    /// Corrección del operador sobre una línea; recalcula la diferencia.
    pub async fn update_return_line(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        product_id: Uuid,
        mermas: i32,
        rec_almacen: i32,
        carga_vehiculo: i32,
    ) -> AppResult<ReturnLine> {
        let mut tx = self.pool.begin().await?;

        let route = lock_route(&mut tx, tenant_id, route_id).await?;
        ensure_completed(&route)?;
        ensure_not_closed(&mut tx, route_id).await?;

        let line =
            update_line_in(&mut tx, route_id, product_id, mermas, rec_almacen, carga_vehiculo)
                .await?;

        tx.commit().await?;
        Ok(line)
    }

    /// Resumen de cierre: totales transaccionales + caja inicial +
    /// valor de la carga, con el monto esperado derivado.
    pub async fn closing_summary(&self, tenant_id: Uuid, route_id: Uuid) -> AppResult<ClosingSummary> {
        let mut conn = self.pool.acquire().await?;

        let route = sqlx::query_as::<_, Route>(
            "SELECT * FROM routes WHERE id = $1 AND tenant_id = $2",
        )
        .bind(route_id)
        .bind(tenant_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found_error("route", &route_id.to_string()))?;

        ensure_completed(&route)?;

        let totals = transaction_totals_in(&mut conn, route_id).await?;
        let valor_carga = load_value_in(&mut conn, route_id).await?;

        Ok(ClosingSummary::compute(
            route_id,
            totals,
            valor_carga,
            route.caja_inicial,
        ))
    }

    /// Cierre definitivo: aplica las correcciones finales, congela el
    /// resumen y registra monto recibido y diferencia con signo. Un
    /// segundo cierre falla y deja el primero intacto.
    pub async fn close(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        monto_recibido: Decimal,
        corrections: Vec<ReturnCorrection>,
        closed_by: Uuid,
    ) -> AppResult<RouteClosing> {
        let mut tx = self.pool.begin().await?;

        let route = lock_route(&mut tx, tenant_id, route_id).await?;
        ensure_completed(&route)?;
        ensure_not_closed(&mut tx, route_id).await?;

        // Sembrar líneas faltantes antes de aplicar correcciones
        refresh_return_lines_in(&mut tx, route_id).await?;

        for c in corrections {
            update_line_in(&mut tx, route_id, c.product_id, c.mermas, c.rec_almacen, c.carga_vehiculo)
                .await?;
        }

        let totals = transaction_totals_in(&mut tx, route_id).await?;
        let valor_carga = load_value_in(&mut tx, route_id).await?;
        let summary =
            ClosingSummary::compute(route_id, totals, valor_carga, route.caja_inicial);
        let diferencia = monto_recibido - summary.a_recibir;

        let closing = sqlx::query_as::<_, RouteClosing>(
            r#"
            INSERT INTO route_closings (
                route_id,
                ventas_contado, ventas_contado_count,
                entregas_cobradas, entregas_cobradas_count,
                cobros, cobros_count,
                ventas_credito, ventas_credito_count,
                entregas_credito, entregas_credito_count,
                entregas_vale, entregas_vale_count,
                preventa, preventa_count,
                devoluciones, devoluciones_count,
                valor_carga, caja_inicial, a_recibir,
                monto_recibido, diferencia, closed_by, closed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
            RETURNING *
            "#,
        )
        .bind(route_id)
        .bind(summary.totals.ventas_contado.monto)
        .bind(summary.totals.ventas_contado.cantidad)
        .bind(summary.totals.entregas_cobradas.monto)
        .bind(summary.totals.entregas_cobradas.cantidad)
        .bind(summary.totals.cobros.monto)
        .bind(summary.totals.cobros.cantidad)
        .bind(summary.totals.ventas_credito.monto)
        .bind(summary.totals.ventas_credito.cantidad)
        .bind(summary.totals.entregas_credito.monto)
        .bind(summary.totals.entregas_credito.cantidad)
        .bind(summary.totals.entregas_vale.monto)
        .bind(summary.totals.entregas_vale.cantidad)
        .bind(summary.totals.preventa.monto)
        .bind(summary.totals.preventa.cantidad)
        .bind(summary.totals.devoluciones.monto)
        .bind(summary.totals.devoluciones.cantidad)
        .bind(summary.valor_carga)
        .bind(summary.caja_inicial)
        .bind(summary.a_recibir)
        .bind(monto_recibido)
        .bind(diferencia)
        .bind(closed_by)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(closing)
    }
}

fn ensure_completed(route: &Route) -> AppResult<()> {
    check_closable(route.id, route.status)
}

/// El cierre (y la edición de retornos) solo corre sobre rutas completadas.
fn check_closable(route_id: Uuid, status: RouteStatus) -> AppResult<()> {
    if status != RouteStatus::Completed {
        return Err(AppError::RouteNotCompleted(format!(
            "route '{}' is in status '{}'",
            route_id,
            status.as_str()
        )));
    }
    Ok(())
}

async fn ensure_not_closed(conn: &mut PgConnection, route_id: Uuid) -> AppResult<()> {
    let existing = sqlx::query_as::<_, RouteClosing>(
        "SELECT * FROM route_closings WHERE route_id = $1",
    )
    .bind(route_id)
    .fetch_optional(conn)
    .await?;

    check_first_close(route_id, existing.as_ref())
}

/// El cierre no es idempotente: con un registro previo se rechaza con
/// `AlreadyClosed` y el registro original queda intacto.
fn check_first_close(route_id: Uuid, existing: Option<&RouteClosing>) -> AppResult<()> {
    if existing.is_some() {
        return Err(AppError::AlreadyClosed(format!(
            "route '{}' already has a closing record",
            route_id
        )));
    }
    Ok(())
}

/// Valor total de la carga asignada a la ruta.
async fn load_value_in(conn: &mut PgConnection, route_id: Uuid) -> AppResult<Decimal> {
    let value: Decimal = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM((cantidad_entrega + cantidad_venta) * unit_price), 0)
        FROM route_load_products WHERE route_id = $1
        "#,
    )
    .bind(route_id)
    .fetch_one(conn)
    .await?;

    Ok(value)
}

/// Upsert de líneas de retorno desde la carga y la actividad reportada.
/// Conserva los campos del operador; la diferencia se recalcula siempre
/// contra las entradas frescas.
async fn refresh_return_lines_in(conn: &mut PgConnection, route_id: Uuid) -> AppResult<()> {
    let products = sqlx::query_as::<_, crate::models::load::LoadProduct>(
        "SELECT * FROM route_load_products WHERE route_id = $1",
    )
    .bind(route_id)
    .fetch_all(&mut *conn)
    .await?;

    let activity = product_activity_in(&mut *conn, route_id).await?;

    for product in products {
        let cargada = product.total_qty();
        let act = activity.get(&product.product_id).copied().unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO route_returns (id, route_id, product_id, cantidad_cargada,
                                       vendidos, entregados, devueltos,
                                       mermas, rec_almacen, carga_vehiculo, diferencia, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, $4,
                    $4 - ($5 + $6 + $7), $8)
            ON CONFLICT (route_id, product_id) DO UPDATE
            SET cantidad_cargada = EXCLUDED.cantidad_cargada,
                vendidos = EXCLUDED.vendidos,
                entregados = EXCLUDED.entregados,
                devueltos = EXCLUDED.devueltos,
                diferencia = route_returns.carga_vehiculo
                    - (EXCLUDED.vendidos + EXCLUDED.entregados + EXCLUDED.devueltos
                       + route_returns.mermas + route_returns.rec_almacen),
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(route_id)
        .bind(product.product_id)
        .bind(cargada)
        .bind(act.vendidos)
        .bind(act.entregados)
        .bind(act.devueltos)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Actualiza los campos del operador y recalcula la diferencia: la ley
/// de conservación se cumple por construcción.
async fn update_line_in(
    conn: &mut PgConnection,
    route_id: Uuid,
    product_id: Uuid,
    mermas: i32,
    rec_almacen: i32,
    carga_vehiculo: i32,
) -> AppResult<ReturnLine> {
    let mut line = sqlx::query_as::<_, ReturnLine>(
        "SELECT * FROM route_returns WHERE route_id = $1 AND product_id = $2 FOR UPDATE",
    )
    .bind(route_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| not_found_error("return line", &product_id.to_string()))?;

    line.mermas = mermas;
    line.rec_almacen = rec_almacen;
    line.carga_vehiculo = carga_vehiculo;
    line.recompute_diferencia();

    let line = sqlx::query_as::<_, ReturnLine>(
        r#"
        UPDATE route_returns
        SET mermas = $3, rec_almacen = $4, carga_vehiculo = $5,
            diferencia = $6, updated_at = $7
        WHERE route_id = $1 AND product_id = $2
        RETURNING *
        "#,
    )
    .bind(route_id)
    .bind(product_id)
    .bind(line.mermas)
    .bind(line.rec_almacen)
    .bind(line.carga_vehiculo)
    .bind(line.diferencia)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;

    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cierre_existente(route_id: Uuid) -> RouteClosing {
        RouteClosing {
            route_id,
            ventas_contado: Decimal::new(4000, 2),
            ventas_contado_count: 3,
            entregas_cobradas: Decimal::new(3000, 2),
            entregas_cobradas_count: 2,
            cobros: Decimal::new(1000, 2),
            cobros_count: 1,
            ventas_credito: Decimal::ZERO,
            ventas_credito_count: 0,
            entregas_credito: Decimal::ZERO,
            entregas_credito_count: 0,
            entregas_vale: Decimal::ZERO,
            entregas_vale_count: 0,
            preventa: Decimal::ZERO,
            preventa_count: 0,
            devoluciones: Decimal::ZERO,
            devoluciones_count: 0,
            valor_carga: Decimal::new(20000, 2),
            caja_inicial: Decimal::new(2000, 2),
            a_recibir: Decimal::new(10000, 2),
            monto_recibido: Decimal::new(10000, 2),
            diferencia: Decimal::ZERO,
            closed_by: Uuid::new_v4(),
            closed_at: Utc::now(),
        }
    }

    #[test]
    fn test_segundo_cierre_rechazado() {
        let route_id = Uuid::new_v4();
        let existente = cierre_existente(route_id);

        let err = check_first_close(route_id, Some(&existente)).unwrap_err();
        assert!(matches!(err, AppError::AlreadyClosed(_)));
        assert_eq!(err.code(), "ALREADY_CLOSED");

        // El registro original no se toca.
        assert_eq!(existente.monto_recibido, Decimal::new(10000, 2));
        assert_eq!(existente.diferencia, Decimal::ZERO);
    }

    #[test]
    fn test_primer_cierre_pasa() {
        assert!(check_first_close(Uuid::new_v4(), None).is_ok());
    }

    #[test]
    fn test_cierre_exige_ruta_completada() {
        let err = check_closable(Uuid::new_v4(), RouteStatus::Started).unwrap_err();
        assert!(matches!(err, AppError::RouteNotCompleted(_)));
        assert!(check_closable(Uuid::new_v4(), RouteStatus::Completed).is_ok());
    }
}
