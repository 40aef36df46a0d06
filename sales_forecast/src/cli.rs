//! Command line interface

use crate::config::{
    ColumnMapping, ProphetConfig, RunConfig, DEFAULT_HORIZON, DEFAULT_PREVIEW_ROWS,
};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Forecast daily sales from a cleaned CSV file.
///
/// With no arguments, reads `data/cleaned_sales.csv` under the working
/// directory and writes `data/sales_forecast.csv` next to it.
#[derive(Debug, Clone, Parser)]
#[command(name = "sales_forecast", version)]
pub struct Cli {
    /// Input CSV [default: <cwd>/data/cleaned_sales.csv]
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output CSV [default: <cwd>/data/sales_forecast.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Periods to forecast past the last observed date
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    pub periods: usize,

    /// Name of the date column in the input
    #[arg(long, default_value = "date")]
    pub date_column: String,

    /// Name of the sales column in the input
    #[arg(long, default_value = "sales")]
    pub value_column: String,

    /// JSON file with model settings
    #[arg(long)]
    pub model_config: Option<PathBuf>,

    /// Rows shown in the data preview (0 to disable)
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,
}

impl Cli {
    /// Resolve the arguments into a run configuration
    pub fn into_config(self) -> Result<RunConfig> {
        let mut config = RunConfig::from_current_dir()?;

        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        config.horizon = self.periods;
        config.columns = ColumnMapping {
            date: self.date_column,
            value: self.value_column,
        };
        if let Some(path) = self.model_config {
            config.model = ProphetConfig::from_json_file(path)?;
        }
        config.preview_rows = self.preview_rows;

        config.validate()?;
        Ok(config)
    }
}
