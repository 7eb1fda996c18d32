//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::events::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub events: EventBus,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig, events: EventBus) -> Self {
        Self {
            pool,
            config,
            events,
        }
    }
}
