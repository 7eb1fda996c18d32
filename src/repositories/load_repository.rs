//! Repositorio de carga del vehículo
//!
//! Dueño de las líneas de producto, los pedidos asignados y la caja
//! inicial de la ruta. Toda mutación exige ruta en borrador con la
//! carga aún no enviada a ejecución.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::load::{LoadOrder, LoadProduct};
use crate::models::route::Route;
use crate::repositories::route_repository::lock_route;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct LoadRepository {
    pool: PgPool,
}

impl LoadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_products(&self, route_id: Uuid) -> AppResult<Vec<LoadProduct>> {
        let products = sqlx::query_as::<_, LoadProduct>(
            "SELECT * FROM route_load_products WHERE route_id = $1 ORDER BY created_at",
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn get_orders(&self, route_id: Uuid) -> AppResult<Vec<LoadOrder>> {
        let orders = sqlx::query_as::<_, LoadOrder>(
            "SELECT * FROM route_load_orders WHERE route_id = $1 ORDER BY created_at",
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Upsert de línea de producto: si ya existe la pareja
    /// (ruta, producto) se reemplazan cantidades y precio.
    pub async fn assign_product(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        product_id: Uuid,
        cantidad_entrega: i32,
        cantidad_venta: i32,
        unit_price: Decimal,
        warehouse_qty: Option<i32>,
    ) -> AppResult<LoadProduct> {
        let mut tx = self.pool.begin().await?;
        lock_editable_load(&mut tx, tenant_id, route_id).await?;

        let product = sqlx::query_as::<_, LoadProduct>(
            r#"
            INSERT INTO route_load_products (id, route_id, product_id, cantidad_entrega,
                                             cantidad_venta, unit_price, warehouse_qty, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (route_id, product_id) DO UPDATE
            SET cantidad_entrega = EXCLUDED.cantidad_entrega,
                cantidad_venta = EXCLUDED.cantidad_venta,
                unit_price = EXCLUDED.unit_price,
                warehouse_qty = EXCLUDED.warehouse_qty
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(route_id)
        .bind(product_id)
        .bind(cantidad_entrega)
        .bind(cantidad_venta)
        .bind(unit_price)
        .bind(warehouse_qty)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn remove_product(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        lock_editable_load(&mut tx, tenant_id, route_id).await?;

        let deleted = sqlx::query(
            "DELETE FROM route_load_products WHERE route_id = $1 AND product_id = $2",
        )
        .bind(route_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            return Err(not_found_error("load product", &product_id.to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Asignación idempotente de un pedido preexistente.
    pub async fn assign_order(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        order_id: Uuid,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        lock_editable_load(&mut tx, tenant_id, route_id).await?;

        sqlx::query(
            r#"
            INSERT INTO route_load_orders (route_id, order_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (route_id, order_id) DO NOTHING
            "#,
        )
        .bind(route_id)
        .bind(order_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn remove_order(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        order_id: Uuid,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        lock_editable_load(&mut tx, tenant_id, route_id).await?;

        let deleted =
            sqlx::query("DELETE FROM route_load_orders WHERE route_id = $1 AND order_id = $2")
                .bind(route_id)
                .bind(order_id)
                .execute(&mut *tx)
                .await?;

        if deleted.rows_affected() == 0 {
            return Err(not_found_error("load order", &order_id.to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Fija la caja con la que sale el vendedor.
    pub async fn set_initial_cash(
        &self,
        tenant_id: Uuid,
        route_id: Uuid,
        amount: Decimal,
        comment: Option<String>,
    ) -> AppResult<Route> {
        let mut tx = self.pool.begin().await?;
        lock_editable_load(&mut tx, tenant_id, route_id).await?;

        let route = sqlx::query_as::<_, Route>(
            r#"
            UPDATE routes
            SET caja_inicial = $3, caja_inicial_comment = $4
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(route_id)
        .bind(tenant_id)
        .bind(amount)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(route)
    }

    /// Compuerta de un solo sentido: marca la carga como finalizada.
    /// No toca el estado de la ruta; repetir la llamada es inocuo.
    pub async fn send_to_execution(&self, tenant_id: Uuid, route_id: Uuid) -> AppResult<Route> {
        let mut tx = self.pool.begin().await?;

        let current = lock_route(&mut tx, tenant_id, route_id).await?;
        if !current.status.is_editable() {
            return Err(AppError::RouteNotEditable(format!(
                "route '{}' is in status '{}'",
                route_id,
                current.status.as_str()
            )));
        }

        let route = sqlx::query_as::<_, Route>(
            "UPDATE routes SET load_finalized = TRUE WHERE id = $1 AND tenant_id = $2 RETURNING *",
        )
        .bind(route_id)
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(route)
    }
}

/// Candado + verificación de que la carga sigue editable: ruta en
/// borrador y carga no enviada a ejecución.
async fn lock_editable_load(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    route_id: Uuid,
) -> AppResult<Route> {
    let route = lock_route(conn, tenant_id, route_id).await?;
    if !route.status.is_editable() {
        return Err(AppError::RouteNotEditable(format!(
            "route '{}' is in status '{}'",
            route_id,
            route.status.as_str()
        )));
    }
    if route.load_finalized {
        return Err(AppError::RouteNotEditable(format!(
            "load of route '{}' was already sent to execution",
            route_id
        )));
    }
    Ok(route)
}
