//! # Stars Forecast
//!
//! Daily GitHub star forecasting service.
//!
//! Given a repository name, the service pulls its daily star history from a
//! star-history provider, fits a forecasting model, and returns 60 days of
//! integer forecasts with uncertainty bands plus the model's trend component.
//! Results are cached per repository and model for a configurable time.
//!
//! ## Architecture
//!
//! - [`upstream`]: star-history provider client and the [`upstream::StarHistorySource`] seam
//! - [`models`]: observations, the gap-free daily series, and response records
//! - [`algorithms`]: Holt-Winters smoothing and the trend/seasonality decomposition model
//! - [`services`]: forecast pipelines, result cache, and the [`services::ForecastService`]
//! - [`config`]: layered service configuration
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Pipelines
//!
//! - **Smoothing**: additive Holt-Winters (weekly season) with bands of
//!   `±1.645·σ·√k`, where σ is the in-sample residual standard deviation.
//! - **Decomposition**: piecewise-linear trend with weekly and yearly Fourier
//!   terms, 80% intervals from the model itself.

pub mod algorithms;

pub mod config;

pub mod error;

pub mod models;

pub mod services;

pub mod upstream;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{ForecastError, Result};
