//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores y
//! validación compartidas por el resto del motor.

pub mod errors;
pub mod validation;
