//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del motor
//! y su conversión a respuestas HTTP apropiadas. Todas las
//! condiciones de dominio son recuperables y visibles al caller
//! (4xx); el motor no reintenta nada internamente.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Violación de la máquina de estados de ruta o parada.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Mutación de paradas/carga sobre una ruta que no está en borrador.
    #[error("Route not editable: {0}")]
    RouteNotEditable(String),

    /// Inicio de ruta sin paradas.
    #[error("Route has no stops")]
    EmptyRoute,

    /// Reordenamiento con un conjunto de ids que no es permutación exacta.
    #[error("Invalid stop set: {0}")]
    InvalidStopSet(String),

    /// Llegada a una parada con paradas anteriores aún pendientes.
    #[error("Stop out of sequence: {0}")]
    OutOfSequence(String),

    /// Operación de cierre sobre una ruta no completada.
    #[error("Route not completed: {0}")]
    RouteNotCompleted(String),

    /// La ruta ya tiene un registro de cierre inmutable.
    #[error("Route already closed: {0}")]
    AlreadyClosed(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl AppError {
    /// Código estable para que el caller distinga condiciones de dominio.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidTransition(_) => "INVALID_TRANSITION",
            AppError::RouteNotEditable(_) => "ROUTE_NOT_EDITABLE",
            AppError::EmptyRoute => "EMPTY_ROUTE",
            AppError::InvalidStopSet(_) => "INVALID_STOP_SET",
            AppError::OutOfSequence(_) => "OUT_OF_SEQUENCE",
            AppError::RouteNotCompleted(_) => "ROUTE_NOT_COMPLETED",
            AppError::AlreadyClosed(_) => "ALREADY_CLOSED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmptyRoute | AppError::InvalidStopSet(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidTransition(_)
            | AppError::RouteNotEditable(_)
            | AppError::OutOfSequence(_)
            | AppError::RouteNotCompleted(_)
            | AppError::AlreadyClosed(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();

        let (error, message, details) = match &self {
            AppError::Database(e) => {
                error!("Database error: {}", e);
                (
                    "Database Error".to_string(),
                    "An error occurred while accessing the database".to_string(),
                    Some(json!({ "sql_error": e.to_string() })),
                )
            }
            AppError::Validation(e) => {
                warn!("Validation error: {}", e);
                (
                    "Validation Error".to_string(),
                    "The provided data is invalid".to_string(),
                    Some(json!(e)),
                )
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    "Internal Server Error".to_string(),
                    "An unexpected error occurred".to_string(),
                    Some(json!({ "internal_error": msg })),
                )
            }
            other => {
                warn!("{}", other);
                (
                    status
                        .canonical_reason()
                        .unwrap_or("Error")
                        .to_string(),
                    other.to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error,
            message,
            details,
            code,
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de transición inválida
pub fn invalid_transition(entity: &str, from: &str, to: &str) -> AppError {
    AppError::InvalidTransition(format!("{} cannot move from '{}' to '{}'", entity, from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codigos_de_dominio() {
        assert_eq!(AppError::EmptyRoute.code(), "EMPTY_ROUTE");
        assert_eq!(
            AppError::OutOfSequence("stop 3".into()).code(),
            "OUT_OF_SEQUENCE"
        );
        assert_eq!(
            AppError::AlreadyClosed("route".into()).code(),
            "ALREADY_CLOSED"
        );
    }

    #[test]
    fn test_condiciones_de_dominio_son_4xx() {
        let errores = [
            AppError::InvalidTransition("r".into()),
            AppError::RouteNotEditable("r".into()),
            AppError::EmptyRoute,
            AppError::InvalidStopSet("r".into()),
            AppError::OutOfSequence("r".into()),
            AppError::RouteNotCompleted("r".into()),
            AppError::AlreadyClosed("r".into()),
            AppError::NotFound("r".into()),
        ];
        for e in errores {
            assert!(e.status().is_client_error(), "{:?}", e.code());
        }
    }
}
