//! DTOs del libro de carga

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::load::LoadProduct;

/// Request para asignar (upsert) una línea de producto a la carga
#[derive(Debug, Deserialize, Validate)]
pub struct AssignProductRequest {
    pub product_id: Uuid,

    /// Cantidad para entrega de pedidos preexistentes.
    #[validate(range(min = 0))]
    pub cantidad_entrega: i32,

    /// Cantidad para venta en ruta.
    #[validate(range(min = 0))]
    pub cantidad_venta: i32,

    /// Si se omite, se toma el precio base del catálogo.
    pub unit_price: Option<Decimal>,

    #[validate(range(min = 0))]
    pub warehouse_qty: Option<i32>,
}

/// Request para asignar un pedido preexistente a la ruta
#[derive(Debug, Deserialize)]
pub struct AssignOrderRequest {
    pub order_id: Uuid,
}

/// Request para fijar la caja inicial del vendedor
#[derive(Debug, Deserialize, Validate)]
pub struct SetInitialCashRequest {
    pub amount: Decimal,

    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Línea de producto con su total derivado
#[derive(Debug, Serialize)]
pub struct LoadProductResponse {
    pub product_id: Uuid,
    pub cantidad_entrega: i32,
    pub cantidad_venta: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub warehouse_qty: Option<i32>,
}

impl From<LoadProduct> for LoadProductResponse {
    fn from(p: LoadProduct) -> Self {
        let total = p.total_value();
        Self {
            product_id: p.product_id,
            cantidad_entrega: p.cantidad_entrega,
            cantidad_venta: p.cantidad_venta,
            unit_price: p.unit_price,
            total,
            warehouse_qty: p.warehouse_qty,
        }
    }
}

/// Vista completa de la carga de una ruta
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub route_id: Uuid,
    pub products: Vec<LoadProductResponse>,
    pub order_ids: Vec<Uuid>,
    pub caja_inicial: Decimal,
    pub caja_inicial_comment: Option<String>,
    pub load_finalized: bool,
    /// Valor total asignado a la ruta.
    pub valor_carga: Decimal,
}
