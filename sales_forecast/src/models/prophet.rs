//! Additive trend + seasonality model in the style of Prophet
//!
//! `y(t) = trend(t) + Σ seasonality(t) + ε`, where the trend is piecewise
//! linear with automatically placed changepoints and each seasonality is a
//! Fourier series. Coefficients are the penalised least squares estimate on
//! scaled data: slope changes and seasonal coefficients are shrunk towards
//! zero according to their prior scales.

use crate::config::ProphetConfig;
use crate::data::InputRecord;
use crate::error::{ForecastError, Result};
use crate::forecast::{ComponentColumn, ForecastFrame, ForecastRecord};
use crate::models::seasonality::{resolve_seasonalities, Seasonality};
use crate::models::uncertainty::{simulate_bounds, SimulationInput, TrendParams};
use crate::models::{FittedModel, ForecastModel};
use crate::utils::{future_dates, infer_frequency, unique_sorted, Frequency};
use chrono::NaiveDateTime;
use forecast_math::changepoints::{changepoint_indices, hinge_features, piecewise_linear};
use forecast_math::least_squares::fit_ridge;
use forecast_math::statistics::{abs_max_scale, root_mean_square};

/// Assumed noise scale when turning prior scales into ridge penalties
const NOISE_PRIOR_SCALE: f64 = 0.5;

const MODEL_NAME: &str = "Prophet (additive)";

/// Unfitted model
#[derive(Debug, Clone)]
pub struct Prophet {
    /// Name of the model
    name: String,
    config: ProphetConfig,
}

/// A seasonality together with its fitted coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct FittedSeasonality {
    pub seasonality: Seasonality,
    pub coefficients: Vec<f64>,
}

/// Fitted model
#[derive(Debug, Clone)]
pub struct FittedProphet {
    name: String,
    config: ProphetConfig,
    /// First fitted date, origin of scaled time
    start: NaiveDateTime,
    /// Length of the fitted history in days
    t_scale: f64,
    y_scale: f64,
    /// Sorted unique dates of every input row, including rows without a value
    history_dates: Vec<NaiveDateTime>,
    frequency: Frequency,
    trend: TrendParams,
    seasonalities: Vec<FittedSeasonality>,
    /// Residual scale on the scaled axis
    sigma: f64,
}

impl Prophet {
    /// Create a model with the given settings
    pub fn new(config: ProphetConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            name: MODEL_NAME.to_string(),
            config,
        })
    }

    pub fn config(&self) -> &ProphetConfig {
        &self.config
    }
}

impl Default for Prophet {
    fn default() -> Self {
        Self {
            name: MODEL_NAME.to_string(),
            config: ProphetConfig::default(),
        }
    }
}

impl ForecastModel for Prophet {
    type Fitted = FittedProphet;

    fn fit(&self, history: &[InputRecord]) -> Result<FittedProphet> {
        let mut observed: Vec<(NaiveDateTime, f64)> = history
            .iter()
            .filter_map(|r| r.y.filter(|y| !y.is_nan()).map(|y| (r.ds, y)))
            .collect();
        if observed.len() < 2 {
            return Err(ForecastError::ForecastingError(
                "Dataframe has less than 2 non-NaN rows.".to_string(),
            ));
        }
        observed.sort_by_key(|(ds, _)| *ds);

        let dates: Vec<NaiveDateTime> = observed.iter().map(|(ds, _)| *ds).collect();
        let values: Vec<f64> = observed.iter().map(|(_, y)| *y).collect();

        let start = dates[0];
        let end = dates[dates.len() - 1];
        let t_scale = (end - start).num_milliseconds() as f64 / 86_400_000.0;
        if t_scale <= 0.0 {
            return Err(ForecastError::ForecastingError(
                "History must span at least two distinct dates".to_string(),
            ));
        }

        let y_scale = abs_max_scale(&values)?;
        let y: Vec<f64> = values.iter().map(|v| v / y_scale).collect();
        let t = scaled_time(&dates, start, t_scale);

        let changepoints: Vec<f64> = changepoint_indices(
            dates.len(),
            self.config.n_changepoints,
            self.config.changepoint_range,
        )?
        .into_iter()
        .map(|idx| t[idx])
        .collect();

        let seasonalities = resolve_seasonalities(&self.config, &dates);

        // Design: [1, t, hinges..., fourier...]
        let mut columns: Vec<Vec<f64>> = vec![vec![1.0; t.len()], t.clone()];
        let mut penalties = vec![0.0, 0.0];

        let changepoint_penalty = (NOISE_PRIOR_SCALE / self.config.changepoint_prior_scale).powi(2);
        for hinge in hinge_features(&t, &changepoints) {
            columns.push(hinge);
            penalties.push(changepoint_penalty);
        }

        let seasonal_penalty = (NOISE_PRIOR_SCALE / self.config.seasonality_prior_scale).powi(2);
        for seasonality in &seasonalities {
            for feature in seasonality.features(&dates)? {
                columns.push(feature);
                penalties.push(seasonal_penalty);
            }
        }

        let fit = fit_ridge(&columns, &y, &penalties)?;
        let beta = fit.coefficients;

        let residuals: Vec<f64> = fit
            .fitted
            .iter()
            .zip(&y)
            .map(|(fitted, observed)| observed - fitted)
            .collect();
        let sigma = root_mean_square(&residuals)?;

        let n_hinges = changepoints.len();
        let trend = TrendParams {
            m: beta[0],
            k: beta[1],
            deltas: beta.iter().skip(2).take(n_hinges).copied().collect(),
            changepoints,
        };

        let mut offset = 2 + n_hinges;
        let seasonalities = seasonalities
            .into_iter()
            .map(|seasonality| {
                let width = seasonality.width();
                let coefficients = beta.iter().skip(offset).take(width).copied().collect();
                offset += width;
                FittedSeasonality {
                    seasonality,
                    coefficients,
                }
            })
            .collect();

        let history_dates = unique_sorted(&history.iter().map(|r| r.ds).collect::<Vec<_>>());
        let frequency = infer_frequency(&history_dates)?;

        log::info!(
            "Fitted {} on {} rows: {} changepoints, frequency {}, residual scale {:.4}",
            self.name,
            dates.len(),
            trend.changepoints.len(),
            frequency,
            sigma * y_scale
        );

        Ok(FittedProphet {
            name: self.name.clone(),
            config: self.config.clone(),
            start,
            t_scale,
            y_scale,
            history_dates,
            frequency,
            trend,
            seasonalities,
            sigma,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn scaled_time(dates: &[NaiveDateTime], start: NaiveDateTime, t_scale: f64) -> Vec<f64> {
    dates
        .iter()
        .map(|d| (*d - start).num_milliseconds() as f64 / 86_400_000.0 / t_scale)
        .collect()
}

impl FittedProphet {
    /// Native spacing inferred from the history
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn history_dates(&self) -> &[NaiveDateTime] {
        &self.history_dates
    }

    pub fn trend_params(&self) -> &TrendParams {
        &self.trend
    }

    pub fn seasonalities(&self) -> &[FittedSeasonality] {
        &self.seasonalities
    }

    /// Residual scale in original units
    pub fn residual_scale(&self) -> f64 {
        self.sigma * self.y_scale
    }
}

impl FittedModel for FittedProphet {
    fn make_future_dates(&self, periods: usize) -> Result<Vec<NaiveDateTime>> {
        let last = *self
            .history_dates
            .last()
            .ok_or_else(|| ForecastError::ForecastingError("Model has no history".to_string()))?;

        let mut dates = self.history_dates.clone();
        dates.extend(future_dates(last, periods, self.frequency)?);
        Ok(dates)
    }

    fn predict(&self, dates: &[NaiveDateTime]) -> Result<ForecastFrame> {
        if dates.is_empty() {
            return Err(ForecastError::ValidationError(
                "No dates to predict".to_string(),
            ));
        }

        let mut dates = dates.to_vec();
        dates.sort_unstable();
        let n = dates.len();
        let t = scaled_time(&dates, self.start, self.t_scale);

        let trend = piecewise_linear(
            &t,
            self.trend.k,
            self.trend.m,
            &self.trend.deltas,
            &self.trend.changepoints,
        )?;

        let mut seasonal_total = vec![0.0; n];
        let mut seasonal_columns = Vec::with_capacity(self.seasonalities.len());
        for fitted in &self.seasonalities {
            let values = fitted.seasonality.evaluate(&dates, &fitted.coefficients)?;
            for (total, v) in seasonal_total.iter_mut().zip(&values) {
                *total += v;
            }
            seasonal_columns.push(ComponentColumn::exact(
                fitted.seasonality.name.clone(),
                values.iter().map(|v| v * self.y_scale).collect(),
            ));
        }

        let bounds = simulate_bounds(&SimulationInput {
            t: &t,
            trend: &self.trend,
            seasonal: &seasonal_total,
            sigma: self.sigma,
            y_scale: self.y_scale,
            samples: self.config.uncertainty_samples,
            interval_width: self.config.interval_width,
            seed: self.config.seed,
        })?;

        let records = (0..n)
            .map(|i| ForecastRecord {
                ds: dates[i],
                yhat: (trend[i] + seasonal_total[i]) * self.y_scale,
                yhat_lower: bounds.yhat_lower[i],
                yhat_upper: bounds.yhat_upper[i],
            })
            .collect();

        let additive_terms: Vec<f64> = seasonal_total.iter().map(|v| v * self.y_scale).collect();
        let mut frame = ForecastFrame::new(records)?
            .with_component(ComponentColumn::new(
                "trend",
                trend.iter().map(|v| v * self.y_scale).collect(),
                bounds.trend_lower,
                bounds.trend_upper,
            )?)?
            .with_component(ComponentColumn::exact("additive_terms", additive_terms))?;
        for column in seasonal_columns {
            frame = frame.with_component(column)?;
        }

        Ok(frame)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
