//! Forecasting models.
//!
//! - [`holt_winters`]: additive trend / additive seasonal exponential smoothing
//! - [`decomposition`]: piecewise-linear trend plus Fourier seasonality
//! - [`stats`]: residual statistics shared by both
//! - [`linalg`]: the small dense solver the decomposition fit needs

pub mod decomposition;
pub mod holt_winters;
pub mod linalg;
pub mod stats;

pub use decomposition::{DecompositionConfig, DecompositionModel, FittedDecomposition};
pub use holt_winters::{FittedHoltWinters, HoltWinters, SmoothingParams};

/// Weekly seasonality on daily data.
pub const WEEKLY_PERIOD: usize = 7;
