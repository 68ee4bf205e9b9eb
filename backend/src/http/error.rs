//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (missing, blank or malformed query)
    Validation(String),
    /// Error raised while producing a forecast
    Forecast(ForecastError),
}

impl AppError {
    /// Status code and body for this error.
    pub fn status_and_body(&self) -> (StatusCode, ApiError) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::Forecast(e) => {
                let message = e.to_string();
                match e {
                    ForecastError::UpstreamUnavailable(_) => (
                        StatusCode::BAD_GATEWAY,
                        ApiError::new("UPSTREAM_UNAVAILABLE", message),
                    ),
                    ForecastError::DataUnavailable(_) => (
                        StatusCode::BAD_GATEWAY,
                        ApiError::new("DATA_UNAVAILABLE", message),
                    ),
                    ForecastError::InsufficientData { required, actual } => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        ApiError::new("INSUFFICIENT_DATA", message)
                            .with_details(format!("required={} actual={}", required, actual)),
                    ),
                    ForecastError::FitFailure(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("FIT_FAILURE", message),
                    ),
                    ForecastError::InvalidParameter { .. } | ForecastError::Internal(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("INTERNAL_ERROR", message),
                    ),
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(code = %error.code, "{}", error.message);
        }
        (status, Json(error)).into_response()
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::Forecast(err)
    }
}
