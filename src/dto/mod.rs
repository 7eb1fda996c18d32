//! DTOs de la API
//!
//! Requests y responses que cruzan la frontera HTTP. Los structs de
//! request llevan validación declarativa con `validator`.

pub mod closing_dto;
pub mod common;
pub mod load_dto;
pub mod route_dto;
pub mod stop_dto;
