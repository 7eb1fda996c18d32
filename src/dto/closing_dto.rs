//! DTOs del cierre de ruta

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Corrección del operador sobre una línea de retorno
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReturnLineRequest {
    #[validate(range(min = 0))]
    pub mermas: i32,

    #[validate(range(min = 0))]
    pub rec_almacen: i32,

    #[validate(range(min = 0))]
    pub carga_vehiculo: i32,
}

/// Corrección final aplicada durante el cierre
#[derive(Debug, Deserialize, Validate)]
pub struct ReturnCorrection {
    pub product_id: Uuid,

    #[validate(range(min = 0))]
    pub mermas: i32,

    #[validate(range(min = 0))]
    pub rec_almacen: i32,

    #[validate(range(min = 0))]
    pub carga_vehiculo: i32,
}

/// Request de cierre: monto físicamente recibido + correcciones finales
#[derive(Debug, Deserialize, Validate)]
pub struct CloseRouteRequest {
    pub monto_recibido: Decimal,

    #[validate]
    #[serde(default)]
    pub return_corrections: Vec<ReturnCorrection>,
}
