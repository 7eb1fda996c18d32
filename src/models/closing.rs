//! Modelos de cierre de ruta
//!
//! Contiene las líneas de retorno (conciliación física por producto) y
//! el resumen de cierre (conciliación de efectivo). La ley de
//! conservación por producto es:
//!
//!   carga_vehiculo == vendidos + entregados + devueltos + mermas
//!                     + rec_almacen + diferencia
//!
//! Una diferencia distinta de cero es un hecho reportable, no un error:
//! operativamente las rutas se cierran aun con discrepancias.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Línea de retorno por producto - mapea a la tabla route_returns
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReturnLine {
    pub id: Uuid,
    pub route_id: Uuid,
    pub product_id: Uuid,
    /// Cantidad asignada en la carga (entrega + venta).
    pub cantidad_cargada: i32,
    /// Entradas de solo lectura, reportadas por pedidos/visitas.
    pub vendidos: i32,
    pub entregados: i32,
    pub devueltos: i32,
    /// Campos capturados por el operador al cierre.
    pub mermas: i32,
    pub rec_almacen: i32,
    pub carga_vehiculo: i32,
    /// Derivado; se recalcula en cada escritura.
    pub diferencia: i32,
    pub updated_at: DateTime<Utc>,
}

impl ReturnLine {
    /// Recalcula la diferencia preservando la ley de conservación.
    pub fn recompute_diferencia(&mut self) {
        self.diferencia = compute_diferencia(
            self.carga_vehiculo,
            self.vendidos,
            self.entregados,
            self.devueltos,
            self.mermas,
            self.rec_almacen,
        );
    }

    /// La ley de conservación debe cumplirse exactamente tras cada recálculo.
    pub fn conservation_holds(&self) -> bool {
        self.carga_vehiculo
            == self.vendidos
                + self.entregados
                + self.devueltos
                + self.mermas
                + self.rec_almacen
                + self.diferencia
    }
}

/// diferencia = carga_vehiculo - (vendidos + entregados + devueltos + mermas + rec_almacen)
pub fn compute_diferencia(
    carga_vehiculo: i32,
    vendidos: i32,
    entregados: i32,
    devueltos: i32,
    mermas: i32,
    rec_almacen: i32,
) -> i32 {
    carga_vehiculo - (vendidos + entregados + devueltos + mermas + rec_almacen)
}

/// Total monetario con su número de movimientos
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TotalConteo {
    pub monto: Decimal,
    pub cantidad: i64,
}

impl TotalConteo {
    pub fn new(monto: Decimal, cantidad: i64) -> Self {
        Self { monto, cantidad }
    }
}

/// Totales transaccionales de la ruta, agregados desde route_transactions.
/// Los alimenta el subsistema de pedidos/visitas; el motor solo los lee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionTotals {
    pub ventas_contado: TotalConteo,
    pub entregas_cobradas: TotalConteo,
    pub cobros: TotalConteo,
    pub ventas_credito: TotalConteo,
    pub entregas_credito: TotalConteo,
    pub entregas_vale: TotalConteo,
    pub preventa: TotalConteo,
    pub devoluciones: TotalConteo,
}

/// Resumen de cierre de la ruta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingSummary {
    pub route_id: Uuid,
    #[serde(flatten)]
    pub totals: TransactionTotals,
    /// Valor total de la carga asignada (suma de líneas de producto).
    pub valor_carga: Decimal,
    /// Caja con la que salió el vendedor.
    pub caja_inicial: Decimal,
    /// Monto esperado al cierre.
    pub a_recibir: Decimal,
}

impl ClosingSummary {
    /// a_recibir = ventas contado + entregas cobradas + cobros + caja inicial.
    /// Las líneas a crédito y la preventa son informativas: no suman ni restan.
    pub fn compute(
        route_id: Uuid,
        totals: TransactionTotals,
        valor_carga: Decimal,
        caja_inicial: Decimal,
    ) -> Self {
        let a_recibir = totals.ventas_contado.monto
            + totals.entregas_cobradas.monto
            + totals.cobros.monto
            + caja_inicial;
        Self {
            route_id,
            totals,
            valor_carga,
            caja_inicial,
            a_recibir,
        }
    }
}

/// Registro inmutable de cierre - mapea a la tabla route_closings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RouteClosing {
    pub route_id: Uuid,
    pub ventas_contado: Decimal,
    pub ventas_contado_count: i64,
    pub entregas_cobradas: Decimal,
    pub entregas_cobradas_count: i64,
    pub cobros: Decimal,
    pub cobros_count: i64,
    pub ventas_credito: Decimal,
    pub ventas_credito_count: i64,
    pub entregas_credito: Decimal,
    pub entregas_credito_count: i64,
    pub entregas_vale: Decimal,
    pub entregas_vale_count: i64,
    pub preventa: Decimal,
    pub preventa_count: i64,
    pub devoluciones: Decimal,
    pub devoluciones_count: i64,
    pub valor_carga: Decimal,
    pub caja_inicial: Decimal,
    pub a_recibir: Decimal,
    pub monto_recibido: Decimal,
    /// diferencia = monto_recibido - a_recibir, con signo, tal cual.
    pub diferencia: Decimal,
    pub closed_by: Uuid,
    pub closed_at: DateTime<Utc>,
}

/// Tipos de movimiento reconocidos en route_transactions
pub mod tx_type {
    pub const CASH_SALE: &str = "cash_sale";
    pub const CASH_DELIVERY: &str = "cash_delivery";
    pub const DEBT_COLLECTION: &str = "debt_collection";
    pub const CREDIT_SALE: &str = "credit_sale";
    pub const CREDIT_DELIVERY: &str = "credit_delivery";
    pub const OVERPAY_CREDIT_DELIVERY: &str = "overpay_credit_delivery";
    pub const PRESALE: &str = "presale";
    pub const RETURN: &str = "return";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linea(
        cargada: i32,
        vendidos: i32,
        entregados: i32,
        devueltos: i32,
        mermas: i32,
        rec_almacen: i32,
        carga_vehiculo: i32,
    ) -> ReturnLine {
        let mut l = ReturnLine {
            id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            cantidad_cargada: cargada,
            vendidos,
            entregados,
            devueltos,
            mermas,
            rec_almacen,
            carga_vehiculo,
            diferencia: 0,
            updated_at: Utc::now(),
        };
        l.recompute_diferencia();
        l
    }

    #[test]
    fn test_conciliacion_cuadrada() {
        // Escenario: 100 = 40 + 30 + 10 + 5 + 15, diferencia 0
        let l = linea(100, 40, 30, 10, 5, 15, 100);
        assert_eq!(l.diferencia, 0);
        assert!(l.conservation_holds());
    }

    #[test]
    fn test_diferencia_no_cero_se_preserva() {
        // Faltan 7 unidades: reportable, no error
        let l = linea(100, 40, 30, 10, 5, 8, 100);
        assert_eq!(l.diferencia, 7);
        assert!(l.conservation_holds());

        // Sobrante: diferencia negativa también se conserva
        let l = linea(100, 50, 40, 10, 5, 15, 100);
        assert_eq!(l.diferencia, -20);
        assert!(l.conservation_holds());
    }

    #[test]
    fn test_recalculo_idempotente() {
        let mut l = linea(100, 40, 30, 10, 5, 15, 100);
        let d1 = l.diferencia;
        l.recompute_diferencia();
        l.recompute_diferencia();
        assert_eq!(l.diferencia, d1);
    }

    #[test]
    fn test_conservacion_por_construccion() {
        // La ley se cumple para cualquier combinación de entradas
        for carga in [0, 50, 100] {
            for vendidos in [0, 20, 60] {
                for mermas in [0, 3] {
                    let l = linea(carga, vendidos, 10, 5, mermas, 2, carga);
                    assert!(l.conservation_holds(), "línea: {:?}", l);
                }
            }
        }
    }

    fn totales() -> TransactionTotals {
        TransactionTotals {
            ventas_contado: TotalConteo::new(Decimal::new(40000, 2), 12),
            entregas_cobradas: TotalConteo::new(Decimal::new(30000, 2), 5),
            cobros: TotalConteo::new(Decimal::new(20000, 2), 3),
            ventas_credito: TotalConteo::new(Decimal::new(15000, 2), 4),
            entregas_credito: TotalConteo::new(Decimal::new(8000, 2), 2),
            entregas_vale: TotalConteo::new(Decimal::new(1200, 2), 1),
            preventa: TotalConteo::new(Decimal::new(50000, 2), 9),
            devoluciones: TotalConteo::new(Decimal::new(2500, 2), 2),
        }
    }

    #[test]
    fn test_a_recibir() {
        // 400 + 300 + 200 + 100 de caja = 1000; el crédito y la preventa no suman
        let s = ClosingSummary::compute(
            Uuid::new_v4(),
            totales(),
            Decimal::new(123456, 2),
            Decimal::new(10000, 2),
        );
        assert_eq!(s.a_recibir, Decimal::new(100000, 2));
    }

    #[test]
    fn test_diferencia_de_cierre_con_signo() {
        // Escenario: esperado 1000, recibido 950 -> diferencia -50
        let s = ClosingSummary::compute(
            Uuid::new_v4(),
            totales(),
            Decimal::ZERO,
            Decimal::new(10000, 2),
        );
        let monto_recibido = Decimal::new(95000, 2);
        let diferencia = monto_recibido - s.a_recibir;
        assert_eq!(diferencia, Decimal::new(-5000, 2));
    }
}
