//! Fourier bases for periodic components

use std::f64::consts::PI;

use crate::{MathError, Result};

/// Build the Fourier feature columns for one seasonality.
///
/// `t` is measured in the same unit as `period` (days in practice). The
/// returned columns are ordered `sin(1), cos(1), sin(2), cos(2), ...`, each
/// holding one value per entry of `t`.
pub fn fourier_series(t: &[f64], period: f64, order: usize) -> Result<Vec<Vec<f64>>> {
    if !(period.is_finite() && period > 0.0) {
        return Err(MathError::InvalidInput(format!(
            "Seasonal period must be positive, got {}",
            period
        )));
    }
    if order == 0 {
        return Err(MathError::InvalidInput(
            "Fourier order must be at least 1".to_string(),
        ));
    }

    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(2 * order);
    for k in 1..=order {
        let angular = 2.0 * PI * k as f64 / period;
        columns.push(t.iter().map(|&x| (angular * x).sin()).collect());
        columns.push(t.iter().map(|&x| (angular * x).cos()).collect());
    }

    Ok(columns)
}

/// Evaluate a seasonal component from its Fourier coefficients.
pub fn evaluate_series(t: &[f64], period: f64, coefficients: &[f64]) -> Result<Vec<f64>> {
    if coefficients.len() % 2 != 0 {
        return Err(MathError::InvalidInput(format!(
            "Fourier coefficients come in sin/cos pairs, got {}",
            coefficients.len()
        )));
    }
    if coefficients.is_empty() {
        return Ok(vec![0.0; t.len()]);
    }

    let columns = fourier_series(t, period, coefficients.len() / 2)?;
    let mut values = vec![0.0; t.len()];
    for (column, beta) in columns.iter().zip(coefficients) {
        for (value, feature) in values.iter_mut().zip(column) {
            *value += beta * feature;
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_columns_are_paired_and_periodic() {
        let t: Vec<f64> = (0..14).map(|d| d as f64).collect();
        let columns = fourier_series(&t, 7.0, 3).unwrap();

        assert_eq!(columns.len(), 6);
        for column in &columns {
            assert_eq!(column.len(), t.len());
            // Same phase one week apart
            assert_relative_eq!(column[2], column[9], epsilon = 1e-12);
        }

        // sin(0) = 0, cos(0) = 1
        assert_relative_eq!(columns[0][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(columns[1][0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_evaluate_matches_manual_sum() {
        let t = vec![0.0, 1.0, 2.5];
        let coefficients = vec![2.0, -1.0];
        let values = evaluate_series(&t, 7.0, &coefficients).unwrap();

        for (i, &x) in t.iter().enumerate() {
            let angle = 2.0 * PI * x / 7.0;
            let expected = 2.0 * angle.sin() - angle.cos();
            assert_relative_eq!(values[i], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(fourier_series(&[0.0], 0.0, 3).is_err());
        assert!(fourier_series(&[0.0], 7.0, 0).is_err());
        assert!(evaluate_series(&[0.0], 7.0, &[1.0]).is_err());
        assert_eq!(evaluate_series(&[0.0, 1.0], 7.0, &[]).unwrap(), vec![0.0, 0.0]);
    }
}
