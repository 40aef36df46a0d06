//! Load, validate, fit, predict and save in one run

use crate::config::RunConfig;
use crate::data::{DataLoader, DATE_KEY, VALUE_KEY};
use crate::error::Result;
use crate::forecast::ForecastFrame;
use crate::models::{FittedModel, ForecastModel, Prophet};
use std::fmt;
use std::path::PathBuf;

/// Rows of the forecast echoed after prediction
const TAIL_ROWS: usize = 5;

/// How a run ended.
///
/// The three early exits are expected conditions, not errors: nothing is
/// written and the process still exits cleanly.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Forecast written to `output`
    Completed { rows: usize, output: PathBuf },
    /// The input file does not exist
    MissingInput { path: PathBuf },
    /// The input file exists but could not be read as a table
    LoadFailed { path: PathBuf, reason: String },
    /// The renamed table lacks the model keys, or renaming would duplicate them
    SchemaMismatch {
        missing: Vec<String>,
        duplicated: Vec<String>,
    },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed { output, .. } => {
                write!(f, "Forecast successfully saved to {}", output.display())
            }
            RunOutcome::MissingInput { path } => write!(f, "Error: {} not found.", path.display()),
            RunOutcome::LoadFailed { reason, .. } => write!(f, "Error loading data: {}", reason),
            RunOutcome::SchemaMismatch { missing, .. } if !missing.is_empty() => write!(
                f,
                "Error: Required columns '{}' and '{}' are not present in the data.",
                DATE_KEY, VALUE_KEY
            ),
            RunOutcome::SchemaMismatch { duplicated, .. } => write!(
                f,
                "Error: Renaming would duplicate the columns '{}' already present in the data.",
                duplicated.join("', '")
            ),
        }
    }
}

/// Runs one forecast with a given model
#[derive(Debug)]
pub struct ForecastRunner<M: ForecastModel> {
    config: RunConfig,
    model: M,
}

impl ForecastRunner<Prophet> {
    /// Runner with the additive model built from `config.model`
    pub fn new(config: RunConfig) -> Result<Self> {
        let model = Prophet::new(config.model.clone())?;
        Self::with_model(config, model)
    }
}

impl<M: ForecastModel> ForecastRunner<M> {
    /// Runner with any model implementation
    pub fn with_model(config: RunConfig, model: M) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, model })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the run.
    ///
    /// Missing input, unreadable input and a missing column end the run with
    /// the matching [`RunOutcome`]. Invalid dates, model failures and write
    /// failures are returned as errors.
    pub fn run(&self) -> Result<RunOutcome> {
        let input = &self.config.input_path;
        log::info!("Input path: {}", input.display());

        if !input.exists() {
            log::warn!("Input file {} not found", input.display());
            return Ok(RunOutcome::MissingInput {
                path: input.clone(),
            });
        }

        let mut data = match DataLoader::from_csv(input) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("Could not load {}: {}", input.display(), err);
                return Ok(RunOutcome::LoadFailed {
                    path: input.clone(),
                    reason: err.to_string(),
                });
            }
        };
        log::info!(
            "Successfully loaded {} rows from {}",
            data.len(),
            input.display()
        );

        if self.config.preview_rows > 0 {
            log::info!("Data head:\n{}", data.head_preview(self.config.preview_rows));
            log::info!("Data info:\n{}", data.info());
        }

        let duplicated = data.rename_conflicts(&self.config.columns);
        if !duplicated.is_empty() {
            log::warn!(
                "Renaming would duplicate columns: {} (have: {})",
                duplicated.join(", "),
                data.column_names().join(", ")
            );
            return Ok(RunOutcome::SchemaMismatch {
                missing: Vec::new(),
                duplicated,
            });
        }

        data.rename_columns(&self.config.columns)?;
        let missing = data.missing_columns();
        if !missing.is_empty() {
            log::warn!(
                "Missing columns after renaming: {} (have: {})",
                missing.join(", "),
                data.column_names().join(", ")
            );
            return Ok(RunOutcome::SchemaMismatch {
                missing,
                duplicated: Vec::new(),
            });
        }

        let history = data.to_history()?;
        let fitted = self.model.fit(&history)?;
        let future = fitted.make_future_dates(self.config.horizon)?;
        let forecast = fitted.predict(&future)?;

        log::info!("Forecast tail:\n{}", tail_preview(&forecast, TAIL_ROWS)?);

        let output = &self.config.output_path;
        forecast.write_csv(output)?;
        log::info!("Wrote {} rows to {}", forecast.len(), output.display());

        Ok(RunOutcome::Completed {
            rows: forecast.len(),
            output: output.clone(),
        })
    }
}

/// Last `rows` rows of the point forecast and its bounds, as a table
fn tail_preview(forecast: &ForecastFrame, rows: usize) -> Result<String> {
    let tail = forecast
        .to_dataframe()?
        .select(["ds", "yhat", "yhat_lower", "yhat_upper"])?
        .tail(Some(rows));
    Ok(format!("{}", tail))
}
