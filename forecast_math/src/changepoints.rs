//! Piecewise-linear trend with changepoints
//!
//! The trend is written in hinge form:
//!
//! ```text
//! trend(t) = m + k·t + Σ_j δ_j · max(0, t - s_j)
//! ```
//!
//! which is continuous at every changepoint `s_j` and linear in `(m, k, δ)`.

use crate::{MathError, Result};

/// Pick evenly spaced changepoint rows from the first `range` share of the history.
///
/// Returns row indices into the (sorted) history. The first row is never a
/// changepoint, and the requested count is capped so every changepoint gets
/// its own row.
pub fn changepoint_indices(n_history: usize, n_changepoints: usize, range: f64) -> Result<Vec<usize>> {
    if !(0.0..=1.0).contains(&range) {
        return Err(MathError::InvalidInput(format!(
            "Changepoint range must be in [0, 1], got {}",
            range
        )));
    }

    let hist_size = (n_history as f64 * range).floor() as usize;
    let count = n_changepoints.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Ok(Vec::new());
    }

    let last = (hist_size - 1) as f64;
    let indices = (1..=count)
        .map(|i| (i as f64 * last / count as f64).round_ties_even() as usize)
        .collect();

    Ok(indices)
}

/// Hinge feature columns `max(0, t - s_j)`, one column per changepoint.
pub fn hinge_features(t: &[f64], changepoints: &[f64]) -> Vec<Vec<f64>> {
    changepoints
        .iter()
        .map(|&s| t.iter().map(|&x| (x - s).max(0.0)).collect())
        .collect()
}

/// Evaluate the piecewise-linear trend at `t`.
pub fn piecewise_linear(t: &[f64], k: f64, m: f64, deltas: &[f64], changepoints: &[f64]) -> Result<Vec<f64>> {
    if deltas.len() != changepoints.len() {
        return Err(MathError::InvalidInput(format!(
            "Got {} slope changes for {} changepoints",
            deltas.len(),
            changepoints.len()
        )));
    }

    let trend = t
        .iter()
        .map(|&x| {
            let bends: f64 = deltas
                .iter()
                .zip(changepoints)
                .map(|(delta, &s)| delta * (x - s).max(0.0))
                .sum();
            m + k * x + bends
        })
        .collect();

    Ok(trend)
}
