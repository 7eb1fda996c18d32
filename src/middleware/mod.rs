//! Middleware de la aplicación

pub mod actor;
pub mod cors;
