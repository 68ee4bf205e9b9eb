//! Data Transfer Objects for the HTTP API.
//!
//! Forecast payloads are served as [`ForecastResponse`] directly; only the
//! query string and the small message bodies live here.

use serde::{Deserialize, Serialize};

pub use crate::models::{ForecastRecord, ForecastResponse, TrendRecord};

/// Query parameters of the predict endpoints.
///
/// `repo` is optional at the extractor level so that a missing value reaches
/// the handler and is reported as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PredictQuery {
    /// Repository in `owner/name` form
    #[serde(default)]
    pub repo: Option<String>,
}

impl PredictQuery {
    /// The trimmed repository name, if present and non-blank.
    pub fn repo(&self) -> Option<&str> {
        self.repo
            .as_deref()
            .map(str::trim)
            .filter(|repo| !repo.is_empty())
    }
}

/// Plain `{"message": ...}` body used by the root and health endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
