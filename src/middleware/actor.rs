//! Contexto del actor
//!
//! La identidad y el multi-tenant se resuelven aguas arriba: el motor
//! recibe el tenant y el usuario actuante ya resueltos en los headers
//! `x-tenant-id` y `x-user-id` que fija la capa de autenticación.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Tenant y usuario actuante para la request en curso
#[derive(Debug, Clone, Copy)]
pub struct ActorContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = header_uuid(parts, "x-tenant-id")?;
        let user_id = header_uuid(parts, "x-user-id")?;
        Ok(ActorContext { tenant_id, user_id })
    }
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, AppError> {
    let value = parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("missing '{}' header", name)))?;

    Uuid::parse_str(value)
        .map_err(|_| AppError::Unauthorized(format!("'{}' header is not a valid uuid", name)))
}
