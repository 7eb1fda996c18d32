//! Repositorio de datos de ejecución (colaborador externo)
//!
//! Los subsistemas de pedidos y visitas alimentan las tablas
//! route_product_activity y route_transactions durante la ejecución de
//! la ruta. El motor las lee al cierre: nunca las escribe.

use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::closing::{tx_type, TotalConteo, TransactionTotals};
use crate::utils::errors::AppResult;

/// Totales de ejecución por producto (vendidos, entregados, devueltos)
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct ProductActivity {
    pub vendidos: i32,
    pub entregados: i32,
    pub devueltos: i32,
}

#[derive(Debug, FromRow)]
struct ProductActivityRow {
    product_id: Uuid,
    vendidos: i32,
    entregados: i32,
    devueltos: i32,
}

#[derive(Debug, FromRow)]
struct TxAggregateRow {
    tx_type: String,
    monto: Decimal,
    cantidad: i64,
}

/// Actividad por producto de la ruta, indexada por product_id.
pub(crate) async fn product_activity_in(
    conn: &mut PgConnection,
    route_id: Uuid,
) -> AppResult<HashMap<Uuid, ProductActivity>> {
    let rows = sqlx::query_as::<_, ProductActivityRow>(
        "SELECT product_id, vendidos, entregados, devueltos
         FROM route_product_activity WHERE route_id = $1",
    )
    .bind(route_id)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            (
                r.product_id,
                ProductActivity {
                    vendidos: r.vendidos,
                    entregados: r.entregados,
                    devueltos: r.devueltos,
                },
            )
        })
        .collect())
}

/// Totales transaccionales agregados por tipo de movimiento.
pub(crate) async fn transaction_totals_in(
    conn: &mut PgConnection,
    route_id: Uuid,
) -> AppResult<TransactionTotals> {
    let rows = sqlx::query_as::<_, TxAggregateRow>(
        r#"
        SELECT tx_type, COALESCE(SUM(amount), 0) AS monto, COUNT(*) AS cantidad
        FROM route_transactions
        WHERE route_id = $1
        GROUP BY tx_type
        "#,
    )
    .bind(route_id)
    .fetch_all(conn)
    .await?;

    let mut totals = TransactionTotals::default();
    for row in rows {
        let total = TotalConteo::new(row.monto, row.cantidad);
        match row.tx_type.as_str() {
            tx_type::CASH_SALE => totals.ventas_contado = total,
            tx_type::CASH_DELIVERY => totals.entregas_cobradas = total,
            tx_type::DEBT_COLLECTION => totals.cobros = total,
            tx_type::CREDIT_SALE => totals.ventas_credito = total,
            tx_type::CREDIT_DELIVERY => totals.entregas_credito = total,
            tx_type::OVERPAY_CREDIT_DELIVERY => totals.entregas_vale = total,
            tx_type::PRESALE => totals.preventa = total,
            tx_type::RETURN => totals.devoluciones = total,
            // Tipos desconocidos se ignoran: el feed es de otro subsistema
            _ => {}
        }
    }

    Ok(totals)
}
