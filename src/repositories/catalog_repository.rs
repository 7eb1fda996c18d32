//! Repositorio de catálogo (colaborador externo)
//!
//! El catálogo de productos lo administra otro subsistema; el motor
//! solo lo consulta para validar existencia y resolver el precio base.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::utils::errors::AppResult;

pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Precio base del producto; `None` si el producto no existe.
    pub async fn base_price(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<Option<Decimal>> {
        let price: Option<Decimal> = sqlx::query_scalar(
            "SELECT base_price FROM products WHERE id = $1 AND tenant_id = $2",
        )
        .bind(product_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }
}
