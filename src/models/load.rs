//! Modelo de carga del vehículo
//!
//! La carga de una ruta son las líneas de producto (cantidad para
//! entrega de pedidos + cantidad para venta en ruta, con precio
//! unitario) y los pedidos preexistentes asignados para entrega.
//! Solo es editable mientras la ruta está en borrador y la carga no
//! fue enviada a ejecución.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Línea de producto cargado - mapea a la tabla route_load_products
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoadProduct {
    pub id: Uuid,
    pub route_id: Uuid,
    pub product_id: Uuid,
    pub cantidad_entrega: i32,
    pub cantidad_venta: i32,
    pub unit_price: Decimal,
    pub warehouse_qty: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl LoadProduct {
    /// Cantidad total cargada para esta línea.
    pub fn total_qty(&self) -> i32 {
        self.cantidad_entrega + self.cantidad_venta
    }

    /// Valor de la línea: (entrega + venta) × precio unitario.
    pub fn total_value(&self) -> Decimal {
        Decimal::from(self.total_qty()) * self.unit_price
    }
}

/// Pedido preexistente asignado a la ruta para entrega
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoadOrder {
    pub route_id: Uuid,
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Ids de pedido de la carga, en el orden de asignación recibido.
pub fn order_ids(orders: &[LoadOrder]) -> Vec<Uuid> {
    orders.iter().map(|o| o.order_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(entrega: i32, venta: i32, unit_price: Decimal) -> LoadProduct {
        LoadProduct {
            id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            cantidad_entrega: entrega,
            cantidad_venta: venta,
            unit_price,
            warehouse_qty: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_de_linea() {
        // 10 para entrega + 5 para venta a 2.50 = 37.50
        let l = line(10, 5, Decimal::new(250, 2));
        assert_eq!(l.total_qty(), 15);
        assert_eq!(l.total_value(), Decimal::new(3750, 2));
    }

    #[test]
    fn test_linea_vacia() {
        let l = line(0, 0, Decimal::new(999, 2));
        assert_eq!(l.total_qty(), 0);
        assert_eq!(l.total_value(), Decimal::ZERO);
    }

    #[test]
    fn test_ids_de_pedido_conservan_orden() {
        let route_id = Uuid::new_v4();
        let esperados: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let orders: Vec<LoadOrder> = esperados
            .iter()
            .map(|&order_id| LoadOrder {
                route_id,
                order_id,
                created_at: Utc::now(),
            })
            .collect();

        assert_eq!(order_ids(&orders), esperados);
        assert!(order_ids(&[]).is_empty());
    }
}
