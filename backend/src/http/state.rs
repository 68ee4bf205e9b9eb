//! Application state for the HTTP server.

use std::sync::Arc;

use crate::models::ForecastBackend;
use crate::services::ForecastService;

/// Shared application state passed to all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Forecast orchestration (fetch, fit, cache)
    pub service: Arc<ForecastService>,
    /// Pipeline answering the bare `/predict` route
    pub default_backend: ForecastBackend,
}

impl AppState {
    pub fn new(service: Arc<ForecastService>, default_backend: ForecastBackend) -> Self {
        Self {
            service,
            default_backend,
        }
    }
}
