//! Forecast output: records, component columns and CSV persistence

use crate::error::{ForecastError, Result};
use crate::utils::format_timestamps;
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Point forecast and uncertainty bounds for one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub ds: NaiveDateTime,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// An extra model output column, e.g. the trend or one seasonality
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentColumn {
    name: String,
    values: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl ComponentColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if values.len() != lower.len() || values.len() != upper.len() {
            return Err(ForecastError::ValidationError(format!(
                "Component '{}' has {} values but {} lower and {} upper bounds",
                name,
                values.len(),
                lower.len(),
                upper.len()
            )));
        }

        Ok(Self {
            name,
            values,
            lower,
            upper,
        })
    }

    /// Component whose bounds equal its point estimate
    pub fn exact(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            lower: values.clone(),
            upper: values.clone(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }
}

/// Full model output over the historical and future date index
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastFrame {
    records: Vec<ForecastRecord>,
    components: Vec<ComponentColumn>,
}

impl ForecastFrame {
    /// Create a frame from records that are already in date order
    pub fn new(records: Vec<ForecastRecord>) -> Result<Self> {
        if records.windows(2).any(|w| w[0].ds > w[1].ds) {
            return Err(ForecastError::ValidationError(
                "Forecast records must be in chronological order".to_string(),
            ));
        }

        Ok(Self {
            records,
            components: Vec::new(),
        })
    }

    /// Attach an extra output column
    pub fn with_component(mut self, component: ComponentColumn) -> Result<Self> {
        if component.values.len() != self.records.len() {
            return Err(ForecastError::ValidationError(format!(
                "Component '{}' has {} rows, forecast has {}",
                component.name,
                component.values.len(),
                self.records.len()
            )));
        }
        if self.column_names().iter().any(|c| c == &component.name) {
            return Err(ForecastError::ValidationError(format!(
                "Duplicate forecast column '{}'",
                component.name
            )));
        }

        self.components.push(component);
        Ok(self)
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    pub fn components(&self) -> &[ComponentColumn] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&ComponentColumn> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDateTime> {
        self.records.iter().map(|r| r.ds).collect()
    }

    /// Output column names in write order
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = ["ds", "yhat", "yhat_lower", "yhat_upper"]
            .into_iter()
            .map(str::to_string)
            .collect();
        for component in &self.components {
            names.push(component.name.clone());
            names.push(format!("{}_lower", component.name));
            names.push(format!("{}_upper", component.name));
        }
        names
    }

    /// Last `n` records
    pub fn tail(&self, n: usize) -> &[ForecastRecord] {
        &self.records[self.records.len().saturating_sub(n)..]
    }

    /// Convert into a DataFrame with the `ds, yhat, yhat_lower, yhat_upper` columns first
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = vec![
            Series::new("ds", format_timestamps(&self.dates())),
            Series::new("yhat", self.records.iter().map(|r| r.yhat).collect::<Vec<f64>>()),
            Series::new(
                "yhat_lower",
                self.records.iter().map(|r| r.yhat_lower).collect::<Vec<f64>>(),
            ),
            Series::new(
                "yhat_upper",
                self.records.iter().map(|r| r.yhat_upper).collect::<Vec<f64>>(),
            ),
        ];

        for component in &self.components {
            columns.push(Series::new(&component.name, component.values.as_slice()));
            columns.push(Series::new(
                &format!("{}_lower", component.name),
                component.lower.as_slice(),
            ));
            columns.push(Series::new(
                &format!("{}_upper", component.name),
                component.upper.as_slice(),
            ));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Write the forecast as CSV with a header row.
    ///
    /// The file is written next to `path` first and renamed into place, so a
    /// failed write never leaves a truncated forecast behind.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut df = self.to_dataframe()?;
        let staging = staging_path(path);

        let written = File::create(&staging)
            .map_err(ForecastError::from)
            .and_then(|mut file| {
                CsvWriter::new(&mut file)
                    .has_header(true)
                    .finish(&mut df)
                    .map_err(ForecastError::from)
            });

        if let Err(err) = written {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }

        fs::rename(&staging, path)?;
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("forecast.csv"));
    name.push(".partial");
    path.with_file_name(name)
}
