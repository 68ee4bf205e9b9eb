//! Error types for the forecasting pipeline.
//!
//! Every stage of a forecast request (upstream fetch, series construction,
//! model fit) reports failures through [`ForecastError`]. The HTTP layer maps
//! each variant onto a status code in `http::error`.

use thiserror::Error;

/// Result type for forecasting operations
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while producing a forecast
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// The star-history provider could not be reached or answered with a
    /// non-success status
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider answered, but the payload held no usable observations
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Too few daily points for the requested model
    #[error("Insufficient data: need at least {required} daily points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The numerical fit did not produce a usable model
    #[error("Fit failure: {0}")]
    FitFailure(String),

    /// Invalid model or configuration parameter
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Anything else (task join errors and the like)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForecastError {
    pub(crate) fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ForecastError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::DataUnavailable(format!("malformed star history payload: {}", err))
    }
}
