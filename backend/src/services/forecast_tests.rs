#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::algorithms::stats::{residual_std, residuals};
    use crate::algorithms::{HoltWinters, WEEKLY_PERIOD};
    use crate::error::ForecastError;
    use crate::models::{
        ceil_count, round_cents, DailySeries, ForecastBackend, ForecastResponse, Observation,
        FORECAST_HORIZON,
    };
    use crate::services::forecast::{
        decomposition_forecast, interval_margin, residual_band_forecast, run_pipeline, INTERVAL_Z,
    };

    fn series_from(values: &[i64]) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let observations = values
            .iter()
            .zip(start.iter_days())
            .scan(0, |total, (&daily, date)| {
                *total += daily;
                Some(Observation::new(date, daily, *total))
            })
            .collect();
        DailySeries::from_observations(observations).unwrap()
    }

    fn linear_series(days: i64) -> DailySeries {
        series_from(&(0..days).collect::<Vec<_>>())
    }

    fn noisy_series(days: i64) -> DailySeries {
        let weekly = [3, 8, 9, 7, 6, 1, 0];
        let values: Vec<i64> = (0..days)
            .map(|i| 5 + i / 10 + weekly[(i % 7) as usize] + (i * 7919 % 13) - 5)
            .collect();
        series_from(&values)
    }

    fn assert_well_formed(response: &ForecastResponse, history: usize) {
        assert_eq!(response.forecast_data.len(), FORECAST_HORIZON + 1);
        assert_eq!(response.forecast_trend.len(), history + FORECAST_HORIZON);
        for record in &response.forecast_data {
            assert!(record.yhat >= 0);
            assert!(record.yhat_lower >= 0.0);
            assert!(record.yhat_upper >= 0.0);
            assert!(record.yhat_lower <= record.yhat as f64, "{:?}", record);
            assert!(record.yhat as f64 <= record.yhat_upper, "{:?}", record);
        }
        for pair in response.forecast_data.windows(2) {
            assert_eq!(pair[0].ds.succ_opt(), Some(pair[1].ds));
        }
        for pair in response.forecast_trend.windows(2) {
            assert_eq!(pair[0].ds.succ_opt(), Some(pair[1].ds));
        }
    }

    #[test]
    fn test_interval_margin_scales_with_sqrt_step() {
        assert_eq!(interval_margin(2.0, 1), INTERVAL_Z * 2.0);
        assert!((interval_margin(2.0, 4) - 2.0 * INTERVAL_Z * 2.0).abs() < 1e-12);
        assert_eq!(interval_margin(0.0, 60), 0.0);
        for k in 1..60 {
            assert!(interval_margin(1.3, k + 1) >= interval_margin(1.3, k));
        }
    }

    #[test]
    fn test_linear_growth_scenario() {
        let series = linear_series(120);
        let response = residual_band_forecast(&series, FORECAST_HORIZON).unwrap();
        assert_well_formed(&response, 120);

        // Continuity record sits on the last observed day
        let first = &response.forecast_data[0];
        assert_eq!(first.ds, NaiveDate::from_ymd_opt(2024, 4, 29).unwrap());
        assert_eq!(first.yhat, 119);

        for (k, record) in response.forecast_data[1..].iter().enumerate() {
            let expected = 120 + k as i64;
            assert!((record.yhat - expected).abs() <= 1, "{:?}", record);
            assert!(record.yhat_upper - record.yhat_lower < 0.05, "{:?}", record);
        }

        let last_trend = response.forecast_trend.last().unwrap();
        assert_eq!(last_trend.ds, NaiveDate::from_ymd_opt(2024, 6, 28).unwrap());
        assert!((last_trend.trend - 179.0).abs() < 0.01);
    }

    #[test]
    fn test_constant_series_has_zero_width_bands() {
        let series = series_from(&[5; 30]);
        let response = residual_band_forecast(&series, FORECAST_HORIZON).unwrap();
        assert_well_formed(&response, 30);
        for record in &response.forecast_data {
            assert_eq!(record.yhat, 5);
            assert_eq!(record.yhat_lower, 5.0);
            assert_eq!(record.yhat_upper, 5.0);
        }
    }

    #[test]
    fn test_noisy_series_bands_widen() {
        let series = noisy_series(150);
        let response = residual_band_forecast(&series, FORECAST_HORIZON).unwrap();
        assert_well_formed(&response, 150);

        let width = |i: usize| {
            let r = &response.forecast_data[i];
            r.yhat_upper - r.yhat_lower
        };
        assert!(width(60) > width(1));
    }

    #[test]
    fn test_noisy_series_bands_follow_residual_std() {
        let series = noisy_series(150);
        let observed = series.values();
        let model = HoltWinters::new(WEEKLY_PERIOD)
            .unwrap()
            .optimize(&observed)
            .unwrap();
        let fitted = model.fitted_values();
        let std = residual_std(&residuals(&observed, fitted));
        assert!(std > 1.0, "std {}", std);

        let expected_bounds = |point: f64, step: usize| {
            let margin = 1.645 * std * (step as f64).sqrt();
            let yhat = ceil_count(point) as f64;
            (
                round_cents((point - margin).max(0.0)).min(yhat),
                round_cents((point + margin).max(0.0)).max(yhat),
            )
        };

        let response = residual_band_forecast(&series, FORECAST_HORIZON).unwrap();

        // Day zero reuses the last in-sample fit with a one-step margin
        let last_fit = fitted[fitted.len() - 1];
        let first = &response.forecast_data[0];
        assert_eq!(first.yhat, ceil_count(last_fit));
        assert_eq!((first.yhat_lower, first.yhat_upper), expected_bounds(last_fit, 1));

        let points = model.forecast(FORECAST_HORIZON);
        for (k, point) in points.iter().enumerate() {
            let record = &response.forecast_data[k + 1];
            assert_eq!(record.yhat, ceil_count(*point), "step {}", k + 1);
            assert_eq!(
                (record.yhat_lower, record.yhat_upper),
                expected_bounds(*point, k + 1),
                "step {}",
                k + 1
            );
        }
    }

    #[test]
    fn test_trend_history_matches_observation_dates() {
        let series = noisy_series(40);
        let response = residual_band_forecast(&series, FORECAST_HORIZON).unwrap();
        let dates = series.dates();
        for (record, date) in response.forecast_trend.iter().zip(&dates) {
            assert_eq!(record.ds, *date);
        }
        assert_eq!(response.forecast_trend[40].ds, response.forecast_data[1].ds);
    }

    #[test]
    fn test_residual_band_rejects_short_history() {
        let err = residual_band_forecast(&series_from(&[1, 2, 3, 4, 5, 6, 7]), FORECAST_HORIZON)
            .unwrap_err();
        assert_eq!(
            err,
            ForecastError::InsufficientData {
                required: 8,
                actual: 7
            }
        );
    }

    #[test]
    fn test_minimum_history_is_enough() {
        let series = series_from(&[1, 2, 3, 4, 5, 6, 7, 8]);
        for backend in [ForecastBackend::Smoothing, ForecastBackend::Decomposition] {
            let response = run_pipeline(backend, &series).unwrap();
            assert_well_formed(&response, 8);
        }
    }

    #[test]
    fn test_pipelines_are_deterministic() {
        let series = noisy_series(200);
        for backend in [ForecastBackend::Smoothing, ForecastBackend::Decomposition] {
            let a = serde_json::to_string(&run_pipeline(backend, &series).unwrap()).unwrap();
            let b = serde_json::to_string(&run_pipeline(backend, &series).unwrap()).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_decomposition_forecast_shape() {
        let series = noisy_series(150);
        let response = decomposition_forecast(&series, FORECAST_HORIZON).unwrap();
        assert_well_formed(&response, 150);
        assert_eq!(response.forecast_data[0].ds, series.last_date());
    }

    #[test]
    fn test_decomposition_linear_growth() {
        let series = linear_series(120);
        let response = decomposition_forecast(&series, FORECAST_HORIZON).unwrap();
        for (k, record) in response.forecast_data[1..].iter().enumerate() {
            let expected = 120 + k as i64;
            assert!((record.yhat - expected).abs() <= 3, "{:?}", record);
        }
    }

    #[test]
    fn test_declining_series_is_clamped_at_zero() {
        let values: Vec<i64> = (0..60).map(|i| (60 - i) * 2).collect();
        let series = series_from(&values);
        for backend in [ForecastBackend::Smoothing, ForecastBackend::Decomposition] {
            let response = run_pipeline(backend, &series).unwrap();
            assert_well_formed(&response, 60);
            assert_eq!(response.forecast_data.last().unwrap().yhat, 0);
        }
    }
}
