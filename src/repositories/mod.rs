//! Repositorios de acceso a datos
//!
//! Cada repositorio es dueño del SQL de su recurso. Toda operación que
//! cambia estado verifica sus precondiciones y escribe dentro de una
//! misma transacción: de dos transiciones en carrera solo una gana y
//! la otra recibe un error de dominio, nunca corrupción silenciosa.

pub mod activity_repository;
pub mod catalog_repository;
pub mod closing_repository;
pub mod load_repository;
pub mod route_repository;
pub mod stop_repository;
