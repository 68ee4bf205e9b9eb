//! Additive Holt-Winters exponential smoothing.
//!
//! Level, trend and seasonal components are all additive:
//!
//! ```text
//! ŷ(t)   = l(t-1) + b(t-1) + s(t-m)
//! l(t)   = α (y(t) - s(t-m)) + (1 - α) (l(t-1) + b(t-1))
//! b(t)   = β (l(t) - l(t-1)) + (1 - β) b(t-1)
//! s(t)   = γ (y(t) - l(t)) + (1 - γ) s(t-m)
//! ```
//!
//! [`HoltWinters::optimize`] estimates α, β and γ by minimising the one-step
//! sum of squared errors. The search is a fixed grid followed by a compass
//! search, so identical input always yields identical parameters.

use log::debug;

use super::stats::mean;
use crate::error::{ForecastError, Result};

const PARAM_MIN: f64 = 1e-4;
const PARAM_MAX: f64 = 1.0 - 1e-4;
const GRID: [f64; 10] = [0.05, 0.15, 0.25, 0.35, 0.45, 0.55, 0.65, 0.75, 0.85, 0.95];
const SEARCH_INITIAL_STEP: f64 = 0.05;
const SEARCH_MIN_STEP: f64 = 1e-4;
const SEARCH_MAX_ITERATIONS: usize = 500;

/// Smoothing weights for level (α), trend (β) and season (γ).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl SmoothingParams {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !(0.0 < value && value < 1.0) {
                return Err(ForecastError::invalid_parameter(
                    name,
                    "must be between 0 and 1 (exclusive)",
                ));
            }
        }
        Ok(Self { alpha, beta, gamma })
    }

    fn with(self, axis: usize, value: f64) -> Self {
        let value = value.clamp(PARAM_MIN, PARAM_MAX);
        match axis {
            0 => Self { alpha: value, ..self },
            1 => Self { beta: value, ..self },
            _ => Self { gamma: value, ..self },
        }
    }

    fn get(&self, axis: usize) -> f64 {
        match axis {
            0 => self.alpha,
            1 => self.beta,
            _ => self.gamma,
        }
    }
}

/// Additive Holt-Winters model specification.
#[derive(Debug, Clone, Copy)]
pub struct HoltWinters {
    period: usize,
}

/// Components before the first observation.
#[derive(Debug, Clone)]
struct InitialState {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
}

/// Components after the last observation.
#[derive(Debug, Clone)]
struct FinalState {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
}

impl HoltWinters {
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(ForecastError::invalid_parameter("period", "must be at least 2"));
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Minimum number of observations the initialisation needs.
    pub fn min_observations(&self) -> usize {
        self.period + 1
    }

    /// Fit with fixed smoothing parameters.
    pub fn fit(&self, data: &[f64], params: SmoothingParams) -> Result<FittedHoltWinters> {
        self.check_len(data)?;
        let init = self.initial_state(data);
        let mut fitted = Vec::with_capacity(data.len());
        let state = self.filter(data, &init, params, |_, prediction| fitted.push(prediction));
        let sse = super::stats::sum_squared_errors(data, &fitted);

        if !sse.is_finite() || fitted.iter().any(|f| !f.is_finite()) {
            return Err(ForecastError::FitFailure(
                "smoothing recursion produced non-finite values".to_string(),
            ));
        }

        Ok(FittedHoltWinters {
            params,
            period: self.period,
            n_observations: data.len(),
            level: state.level,
            trend: state.trend,
            seasonal: state.seasonal,
            fitted,
            sse,
        })
    }

    /// Estimate the smoothing parameters and fit.
    pub fn optimize(&self, data: &[f64]) -> Result<FittedHoltWinters> {
        self.check_len(data)?;
        let init = self.initial_state(data);
        let sse = |params: SmoothingParams| self.sse(data, &init, params);

        let mut best: Option<(SmoothingParams, f64)> = None;
        for &alpha in &GRID {
            for &beta in &GRID {
                for &gamma in &GRID {
                    let params = SmoothingParams { alpha, beta, gamma };
                    let candidate = sse(params);
                    if candidate.is_finite() && best.map_or(true, |(_, b)| candidate < b) {
                        best = Some((params, candidate));
                    }
                }
            }
        }

        let (mut params, mut best_sse) = best.ok_or_else(|| {
            ForecastError::FitFailure("no smoothing parameters gave a finite error".to_string())
        })?;

        let mut step = SEARCH_INITIAL_STEP;
        let mut iterations = 0;
        while step >= SEARCH_MIN_STEP && iterations < SEARCH_MAX_ITERATIONS {
            iterations += 1;
            let mut improved = false;
            for axis in 0..3 {
                for direction in [1.0, -1.0] {
                    let candidate = params.with(axis, params.get(axis) + direction * step);
                    let candidate_sse = sse(candidate);
                    if candidate_sse.is_finite() && candidate_sse < best_sse {
                        params = candidate;
                        best_sse = candidate_sse;
                        improved = true;
                    }
                }
            }
            if !improved {
                step /= 2.0;
            }
        }

        debug!(
            "Holt-Winters optimised: alpha={:.4} beta={:.4} gamma={:.4} sse={:.4} ({} iterations)",
            params.alpha, params.beta, params.gamma, best_sse, iterations
        );

        self.fit(data, params)
    }

    fn check_len(&self, data: &[f64]) -> Result<()> {
        if data.len() < self.min_observations() {
            return Err(ForecastError::InsufficientData {
                required: self.min_observations(),
                actual: data.len(),
            });
        }
        Ok(())
    }

    fn initial_state(&self, data: &[f64]) -> InitialState {
        let m = self.period;
        let first_mean = mean(&data[..m]);
        let trend = if data.len() >= 2 * m {
            (mean(&data[m..2 * m]) - first_mean) / m as f64
        } else {
            (data[m] - data[0]) / m as f64
        };

        // first_mean is the level at the middle of the first season
        let center = (m as f64 - 1.0) / 2.0;
        let seasonal = (0..m)
            .map(|i| data[i] - (first_mean + (i as f64 - center) * trend))
            .collect();

        InitialState {
            level: first_mean - (center + 1.0) * trend,
            trend,
            seasonal,
        }
    }

    fn filter<F>(&self, data: &[f64], init: &InitialState, p: SmoothingParams, mut visit: F) -> FinalState
    where
        F: FnMut(usize, f64),
    {
        let mut level = init.level;
        let mut trend = init.trend;
        let mut seasonal = init.seasonal.clone();

        for (t, &y) in data.iter().enumerate() {
            let idx = t % self.period;
            let season = seasonal[idx];
            visit(t, level + trend + season);

            let prev_level = level;
            level = p.alpha * (y - season) + (1.0 - p.alpha) * (level + trend);
            trend = p.beta * (level - prev_level) + (1.0 - p.beta) * trend;
            seasonal[idx] = p.gamma * (y - level) + (1.0 - p.gamma) * season;
        }

        FinalState {
            level,
            trend,
            seasonal,
        }
    }

    fn sse(&self, data: &[f64], init: &InitialState, params: SmoothingParams) -> f64 {
        let mut sse = 0.0;
        self.filter(data, init, params, |t, prediction| {
            let err = data[t] - prediction;
            sse += err * err;
        });
        sse
    }
}

/// A fitted Holt-Winters model.
#[derive(Debug, Clone)]
pub struct FittedHoltWinters {
    params: SmoothingParams,
    period: usize,
    n_observations: usize,
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    fitted: Vec<f64>,
    sse: f64,
}

impl FittedHoltWinters {
    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    /// One-step-ahead in-sample predictions, one per observation.
    pub fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    pub fn sse(&self) -> f64 {
        self.sse
    }

    /// Final level, trend and seasonal indices after the last observation.
    pub fn components(&self) -> (f64, f64, &[f64]) {
        (self.level, self.trend, &self.seasonal)
    }

    /// Point forecasts for the `horizon` steps after the last observation.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|h| {
                let idx = (self.n_observations + h - 1) % self.period;
                self.level + h as f64 * self.trend + self.seasonal[idx]
            })
            .collect()
    }
}
