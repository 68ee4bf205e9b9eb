//! Forecast output records shared by both forecasting pipelines.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of future days every forecast covers.
pub const FORECAST_HORIZON: usize = 60;

/// Which forecasting pipeline produced (or should produce) a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastBackend {
    /// Piecewise-linear trend plus Fourier seasonality, library intervals
    Decomposition,
    /// Additive Holt-Winters with residual-based intervals
    Smoothing,
}

impl ForecastBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastBackend::Decomposition => "decomposition",
            ForecastBackend::Smoothing => "smoothing",
        }
    }
}

impl fmt::Display for ForecastBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "decomposition" | "prophet" => Ok(Self::Decomposition),
            "smoothing" | "statsmodels" | "holt-winters" | "holtwinters" => Ok(Self::Smoothing),
            _ => Err(format!("Unknown forecast backend: {}", s)),
        }
    }
}

/// One forecast row as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub ds: NaiveDate,
    pub yhat: i64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl ForecastRecord {
    /// Build a record from raw model output.
    ///
    /// The point value is clamped at zero and ceiling-rounded; the bounds are
    /// clamped at zero and rounded to cents, then widened to contain `yhat`.
    pub fn normalized(ds: NaiveDate, point: f64, lower: f64, upper: f64) -> Self {
        let yhat = ceil_count(point);
        let yhat_f = yhat as f64;
        let yhat_lower = round_cents(lower.max(0.0)).min(yhat_f);
        let yhat_upper = round_cents(upper.max(0.0)).max(yhat_f);

        Self {
            ds,
            yhat,
            yhat_lower,
            yhat_upper,
        }
    }
}

/// One point of the underlying level, history and horizon alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub ds: NaiveDate,
    pub trend: f64,
}

impl TrendRecord {
    pub fn new(ds: NaiveDate, trend: f64) -> Self {
        Self {
            ds,
            trend: round_cents(trend),
        }
    }
}

/// Response body of the predict endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub forecast_data: Vec<ForecastRecord>,
    pub forecast_trend: Vec<TrendRecord>,
}

/// Round to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Non-negative integer ceiling of a model value.
///
/// Values are snapped to six decimals first so that `120.0000000001` stays 120.
pub fn ceil_count(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let snapped = (value * 1e6).round() / 1e6;
    snapped.max(0.0).ceil() as i64
}
