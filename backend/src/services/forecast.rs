//! Forecast pipelines.
//!
//! Both pipelines take a gap-free [`DailySeries`] and return a
//! [`ForecastResponse`] with `1 + horizon` forecast records (the last
//! observed day followed by the horizon) and `len + horizon` trend records.
//!
//! - [`residual_band_forecast`]: Holt-Winters point forecasts with bands
//!   derived from the in-sample residual standard deviation.
//! - [`decomposition_forecast`]: trend/seasonality decomposition with the
//!   model's own uncertainty intervals.

use log::debug;

use crate::algorithms::{DecompositionConfig, DecompositionModel, HoltWinters, WEEKLY_PERIOD};
use crate::algorithms::stats::{residual_std, residuals};
use crate::error::Result;
use crate::models::{
    DailySeries, ForecastBackend, ForecastRecord, ForecastResponse, TrendRecord, FORECAST_HORIZON,
};

/// Band multiplier for the residual-based intervals.
pub const INTERVAL_Z: f64 = 1.645;

/// Run the pipeline selected by `backend` with the standard horizon.
pub fn run_pipeline(backend: ForecastBackend, series: &DailySeries) -> Result<ForecastResponse> {
    match backend {
        ForecastBackend::Smoothing => residual_band_forecast(series, FORECAST_HORIZON),
        ForecastBackend::Decomposition => decomposition_forecast(series, FORECAST_HORIZON),
    }
}

/// Half-width of the band `step` days past the last observation.
///
/// Step 1 is also used for the continuity record on the last observed day.
pub fn interval_margin(std: f64, step: usize) -> f64 {
    INTERVAL_Z * std * (step as f64).sqrt()
}

/// Holt-Winters forecast with residual-based bands.
pub fn residual_band_forecast(series: &DailySeries, horizon: usize) -> Result<ForecastResponse> {
    let observed = series.values();
    let model = HoltWinters::new(WEEKLY_PERIOD)?.optimize(&observed)?;
    let fitted = model.fitted_values();
    let std = residual_std(&residuals(&observed, fitted));
    let points = model.forecast(horizon);
    let future = series.future_dates(horizon);

    debug!(
        "Residual-band forecast: n={} std={:.4} horizon={}",
        observed.len(),
        std,
        horizon
    );

    let mut forecast_data = Vec::with_capacity(horizon + 1);

    // Continuity record: last in-sample fit on the last observed day
    let last_fit = fitted[fitted.len() - 1];
    let margin = interval_margin(std, 1);
    forecast_data.push(ForecastRecord::normalized(
        series.last_date(),
        last_fit,
        last_fit - margin,
        last_fit + margin,
    ));

    for (k, (ds, point)) in future.iter().zip(&points).enumerate() {
        let margin = interval_margin(std, k + 1);
        forecast_data.push(ForecastRecord::normalized(
            *ds,
            *point,
            point - margin,
            point + margin,
        ));
    }

    let forecast_trend = series
        .dates()
        .into_iter()
        .zip(fitted.iter().copied())
        .chain(future.into_iter().zip(points))
        .map(|(ds, value)| TrendRecord::new(ds, value))
        .collect();

    Ok(ForecastResponse {
        forecast_data,
        forecast_trend,
    })
}

/// Decomposition forecast passing through the model's own intervals.
pub fn decomposition_forecast(series: &DailySeries, horizon: usize) -> Result<ForecastResponse> {
    let model = DecompositionModel::new(DecompositionConfig::default())?;
    let fitted = model.fit(&series.values())?;
    let last_day = fitted.last_day();
    let future = series.future_dates(horizon);

    let mut forecast_data = Vec::with_capacity(horizon + 1);
    let days = std::iter::once((series.last_date(), last_day)).chain(
        future
            .iter()
            .enumerate()
            .map(|(k, ds)| (*ds, last_day + (k + 1) as f64)),
    );
    for (ds, day) in days {
        let (lower, upper) = fitted.interval_at(day);
        forecast_data.push(ForecastRecord::normalized(ds, fitted.predict_at(day), lower, upper));
    }

    let forecast_trend = series
        .dates()
        .into_iter()
        .chain(future)
        .enumerate()
        .map(|(day, ds)| TrendRecord::new(ds, fitted.trend_at(day as f64)))
        .collect();

    Ok(ForecastResponse {
        forecast_data,
        forecast_trend,
    })
}

#[cfg(test)]
#[path = "forecast_tests.rs"]
mod forecast_tests;
