//! Summary statistics over residuals and simulated samples

use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::{MathError, Result};

/// Largest absolute value, used to bring a series onto a unit scale.
///
/// Returns 1.0 for an all-zero series so that scaling never divides by zero.
pub fn abs_max_scale(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot scale an empty series".to_string(),
        ));
    }

    if values.iter().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Series contains non-finite values".to_string(),
        ));
    }

    let scale = values.iter().abs_max();
    Ok(if scale == 0.0 { 1.0 } else { scale })
}

/// Root mean square of a residual series.
pub fn root_mean_square(residuals: &[f64]) -> Result<f64> {
    if residuals.is_empty() {
        return Err(MathError::InsufficientData(
            "No residuals to summarise".to_string(),
        ));
    }

    let mean_square = residuals.iter().map(|r| r * r).mean();
    Ok(mean_square.sqrt())
}

/// Mean absolute value.
pub fn mean_abs(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).mean()
}

/// Empirical quantile of a sample, `q` in `[0, 1]`.
pub fn quantile(sample: &[f64], q: f64) -> Result<f64> {
    if sample.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take a quantile of an empty sample".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidInput(format!(
            "Quantile must be in [0, 1], got {}",
            q
        )));
    }

    let mut data = Data::new(sample.to_vec());
    Ok(data.quantile(q))
}

/// Lower and upper quantiles bracketing the central `width` share of a sample.
pub fn central_interval(sample: &[f64], width: f64) -> Result<(f64, f64)> {
    if !(width > 0.0 && width < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Interval width must be in (0, 1), got {}",
            width
        )));
    }

    let lower = quantile(sample, (1.0 - width) / 2.0)?;
    let upper = quantile(sample, (1.0 + width) / 2.0)?;
    Ok((lower, upper))
}
