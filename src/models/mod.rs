//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean exactamente
//! al schema PostgreSQL, más la lógica de dominio pura (máquinas de
//! estados, secuenciación de paradas, aritmética de cierre).

pub mod closing;
pub mod load;
pub mod route;
pub mod stop;
