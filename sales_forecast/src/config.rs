//! Run and model configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Input file, relative to the working directory
pub const DEFAULT_INPUT: &str = "data/cleaned_sales.csv";
/// Output file, relative to the working directory
pub const DEFAULT_OUTPUT: &str = "data/sales_forecast.csv";
/// Number of periods forecast past the last observed date
pub const DEFAULT_HORIZON: usize = 30;
/// Rows shown in the data preview
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Source column names that get renamed to the model's keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column holding the observation date
    pub date: String,
    /// Column holding the observed value
    pub value: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            value: "sales".to_string(),
        }
    }
}

/// Whether a built-in seasonality is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityToggle {
    /// Enable when the history is long and dense enough
    Auto,
    /// Always enable with the default Fourier order
    On,
    /// Never enable
    Off,
    /// Always enable with the given Fourier order
    Fourier(usize),
}

/// A user-defined seasonality added on top of the built-in ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSeasonality {
    pub name: String,
    /// Period in days
    pub period: f64,
    pub fourier_order: usize,
}

/// Settings of the additive trend + seasonality model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProphetConfig {
    /// Maximum number of potential trend changepoints
    pub n_changepoints: usize,
    /// Share of the history in which changepoints are placed
    pub changepoint_range: f64,
    /// Prior scale of slope changes; larger values give a more flexible trend
    pub changepoint_prior_scale: f64,
    /// Prior scale of seasonal coefficients
    pub seasonality_prior_scale: f64,
    pub yearly_seasonality: SeasonalityToggle,
    pub weekly_seasonality: SeasonalityToggle,
    pub daily_seasonality: SeasonalityToggle,
    pub extra_seasonalities: Vec<CustomSeasonality>,
    /// Width of the uncertainty interval, e.g. 0.8 for 80%
    pub interval_width: f64,
    /// Number of simulated paths used for the intervals
    pub uncertainty_samples: usize,
    /// Seed of the simulation RNG
    pub seed: u64,
}

impl Default for ProphetConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            yearly_seasonality: SeasonalityToggle::Auto,
            weekly_seasonality: SeasonalityToggle::Auto,
            daily_seasonality: SeasonalityToggle::Auto,
            extra_seasonalities: Vec::new(),
            interval_width: 0.8,
            uncertainty_samples: 1000,
            seed: 0,
        }
    }
}

impl ProphetConfig {
    /// Load model settings from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::ConfigError(format!("Cannot open '{}': {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.changepoint_range) {
            return Err(ForecastError::InvalidParameter(format!(
                "changepoint_range must be in [0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.changepoint_prior_scale > 0.0) || !(self.seasonality_prior_scale > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Prior scales must be positive".to_string(),
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval_width must be between 0 and 1, got {}",
                self.interval_width
            )));
        }
        if self.uncertainty_samples == 0 {
            return Err(ForecastError::InvalidParameter(
                "uncertainty_samples must be at least 1".to_string(),
            ));
        }

        let toggles = [
            self.yearly_seasonality,
            self.weekly_seasonality,
            self.daily_seasonality,
        ];
        if toggles.contains(&SeasonalityToggle::Fourier(0)) {
            return Err(ForecastError::InvalidParameter(
                "Fourier order must be at least 1".to_string(),
            ));
        }

        for custom in &self.extra_seasonalities {
            if custom.name.is_empty() || !(custom.period > 0.0) || custom.fourier_order == 0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "Invalid seasonality '{}': period and Fourier order must be positive",
                    custom.name
                )));
            }
        }

        Ok(())
    }
}

/// Everything one forecast run needs
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Periods to forecast past the last observed date
    pub horizon: usize,
    pub columns: ColumnMapping,
    pub model: ProphetConfig,
    /// Rows logged in the data preview, 0 disables the preview
    pub preview_rows: usize,
}

impl RunConfig {
    /// Default file layout under `base`
    pub fn in_dir<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        Self {
            input_path: base.join(DEFAULT_INPUT),
            output_path: base.join(DEFAULT_OUTPUT),
            horizon: DEFAULT_HORIZON,
            columns: ColumnMapping::default(),
            model: ProphetConfig::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    /// Default file layout under the process working directory
    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::in_dir(std::env::current_dir()?))
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 period".to_string(),
            ));
        }
        if self.columns.date.is_empty() || self.columns.value.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Column names must not be empty".to_string(),
            ));
        }
        if self.columns.date == self.columns.value {
            return Err(ForecastError::InvalidParameter(format!(
                "Date and value columns must differ, both are '{}'",
                self.columns.date
            )));
        }
        if self.input_path == self.output_path {
            return Err(ForecastError::InvalidParameter(
                "Output path must differ from the input path".to_string(),
            ));
        }

        self.model.validate()
    }
}
