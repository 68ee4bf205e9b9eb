//! Service layer: forecast pipelines, result caching and orchestration.
//!
//! The HTTP layer only talks to [`ForecastService`]; the pipelines in
//! [`forecast`] are pure functions over a [`DailySeries`](crate::models::DailySeries).

pub mod cache;

pub mod forecast;

pub mod predictor;

pub use cache::{CacheKey, ForecastCache};
pub use forecast::{decomposition_forecast, residual_band_forecast, run_pipeline};
pub use predictor::ForecastService;
