//! Controladores de la API
//!
//! Orquestan repositorios y eventos; la lógica de estado vive en los
//! modelos y el SQL en los repositorios.

pub mod closing_controller;
pub mod load_controller;
pub mod route_controller;
pub mod stop_controller;
