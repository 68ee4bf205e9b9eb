//! Residual statistics.

use statrs::statistics::Statistics;

/// Observed minus fitted, aligned 1:1.
pub fn residuals(observed: &[f64], fitted: &[f64]) -> Vec<f64> {
    observed
        .iter()
        .zip(fitted.iter())
        .map(|(y, f)| y - f)
        .collect()
}

/// Sample standard deviation (N - 1 denominator) of the finite residuals.
///
/// Non-finite residuals are skipped. Fewer than two finite residuals, or a
/// non-finite result, yields 0.
pub fn residual_std(residuals: &[f64]) -> f64 {
    let finite: Vec<f64> = residuals.iter().copied().filter(|r| r.is_finite()).collect();
    if finite.len() < 2 {
        return 0.0;
    }
    let std = finite.std_dev();
    if std.is_finite() {
        std
    } else {
        0.0
    }
}

/// Sum of squared one-step errors.
pub fn sum_squared_errors(observed: &[f64], fitted: &[f64]) -> f64 {
    observed
        .iter()
        .zip(fitted.iter())
        .map(|(y, f)| (y - f) * (y - f))
        .sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residuals() {
        assert_eq!(residuals(&[3.0, 5.0], &[1.0, 6.0]), vec![2.0, -1.0]);
    }

    #[test]
    fn test_residual_std_uses_bessel_correction() {
        // mean 5, squared deviations sum to 32, 32 / 7
        let r = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((residual_std(&r) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_residual_std_skips_nan() {
        let with_nan = [f64::NAN, 1.0, 3.0];
        assert!((residual_std(&with_nan) - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_residual_std_degenerate_inputs() {
        assert_eq!(residual_std(&[]), 0.0);
        assert_eq!(residual_std(&[4.2]), 0.0);
        assert_eq!(residual_std(&[1.5, 1.5, 1.5]), 0.0);
        assert_eq!(residual_std(&[f64::NAN, f64::INFINITY, 2.0]), 0.0);
    }

    #[test]
    fn test_sum_squared_errors() {
        assert_eq!(sum_squared_errors(&[1.0, 2.0], &[0.0, 4.0]), 5.0);
    }
}
