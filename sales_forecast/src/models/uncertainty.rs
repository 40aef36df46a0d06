//! Simulation-based uncertainty intervals
//!
//! Future trend uncertainty assumes the history's rate of trend changes
//! continues: each simulated path draws new changepoints past the end of the
//! history with Laplace-distributed slope changes whose scale is the mean
//! absolute fitted change. Observation noise is Gaussian with the fitted
//! residual scale. Bounds are empirical quantiles over all paths.

use crate::error::{ForecastError, Result};
use forecast_math::changepoints::piecewise_linear;
use forecast_math::statistics::{central_interval, mean_abs};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};
use statrs::distribution::Laplace;

/// Fitted trend in scaled units
#[derive(Debug, Clone, PartialEq)]
pub struct TrendParams {
    /// Base growth rate
    pub k: f64,
    /// Offset
    pub m: f64,
    pub deltas: Vec<f64>,
    /// Changepoint locations in scaled time
    pub changepoints: Vec<f64>,
}

/// Everything the simulation needs, all on the scaled axis
#[derive(Debug, Clone)]
pub struct SimulationInput<'a> {
    pub t: &'a [f64],
    pub trend: &'a TrendParams,
    /// Sum of seasonal components at each `t`
    pub seasonal: &'a [f64],
    /// Residual scale of the fit
    pub sigma: f64,
    /// Multiplier back to the original units
    pub y_scale: f64,
    pub samples: usize,
    pub interval_width: f64,
    pub seed: u64,
}

/// Lower and upper bounds in original units
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedBounds {
    pub yhat_lower: Vec<f64>,
    pub yhat_upper: Vec<f64>,
    pub trend_lower: Vec<f64>,
    pub trend_upper: Vec<f64>,
}

/// Draw one trend path, possibly with new changepoints past `t = 1`
fn sample_trend_path(
    t: &[f64],
    trend: &TrendParams,
    change_rate: Option<&Poisson<f64>>,
    slope_change: &Laplace,
    rng: &mut StdRng,
) -> Result<Vec<f64>> {
    let t_max = t.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let n_changes = match change_rate {
        Some(poisson) if t_max > 1.0 => poisson.sample(rng) as usize,
        _ => 0,
    };
    if n_changes == 0 {
        return Ok(piecewise_linear(
            t,
            trend.k,
            trend.m,
            &trend.deltas,
            &trend.changepoints,
        )?);
    }

    let mut changepoints = trend.changepoints.clone();
    let mut deltas = trend.deltas.clone();
    for _ in 0..n_changes {
        changepoints.push(1.0 + rng.gen::<f64>() * (t_max - 1.0));
        deltas.push(slope_change.sample(rng));
    }

    Ok(piecewise_linear(t, trend.k, trend.m, &deltas, &changepoints)?)
}

/// Simulate prediction and trend intervals
pub fn simulate_bounds(input: &SimulationInput<'_>) -> Result<SimulatedBounds> {
    let n = input.t.len();
    if input.seasonal.len() != n {
        return Err(ForecastError::ValidationError(format!(
            "Seasonal component has {} values for {} dates",
            input.seasonal.len(),
            n
        )));
    }
    if input.samples == 0 {
        return Err(ForecastError::InvalidParameter(
            "At least one simulation sample is required".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(input.seed);
    let noise = Normal::new(0.0, input.sigma).map_err(|e| {
        ForecastError::ForecastingError(format!("Invalid noise scale {}: {}", input.sigma, e))
    })?;

    // Expected number of future changes scales with how far past the history we go
    let t_max = input.t.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let n_changepoints = input.trend.changepoints.len() as f64;
    let change_rate = if t_max > 1.0 && n_changepoints > 0.0 {
        Some(Poisson::new(n_changepoints * (t_max - 1.0)).map_err(|e| {
            ForecastError::ForecastingError(format!("Invalid changepoint rate: {}", e))
        })?)
    } else {
        None
    };
    let laplace_scale = mean_abs(&input.trend.deltas) + 1e-8;
    let slope_change = Laplace::new(0.0, laplace_scale).map_err(|e| {
        ForecastError::ForecastingError(format!(
            "Invalid slope change scale {}: {}",
            laplace_scale, e
        ))
    })?;

    let mut yhat_samples = vec![Vec::with_capacity(input.samples); n];
    let mut trend_samples = vec![Vec::with_capacity(input.samples); n];

    for _ in 0..input.samples {
        let path = sample_trend_path(
            input.t,
            input.trend,
            change_rate.as_ref(),
            &slope_change,
            &mut rng,
        )?;

        for i in 0..n {
            let yhat = path[i] + input.seasonal[i] + noise.sample(&mut rng);
            yhat_samples[i].push(yhat * input.y_scale);
            trend_samples[i].push(path[i] * input.y_scale);
        }
    }

    let mut bounds = SimulatedBounds {
        yhat_lower: Vec::with_capacity(n),
        yhat_upper: Vec::with_capacity(n),
        trend_lower: Vec::with_capacity(n),
        trend_upper: Vec::with_capacity(n),
    };
    for i in 0..n {
        let (lower, upper) = central_interval(&yhat_samples[i], input.interval_width)?;
        bounds.yhat_lower.push(lower);
        bounds.yhat_upper.push(upper);

        let (lower, upper) = central_interval(&trend_samples[i], input.interval_width)?;
        bounds.trend_lower.push(lower);
        bounds.trend_upper.push(upper);
    }

    Ok(bounds)
}
