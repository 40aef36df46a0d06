//! Sales data loading and schema handling

use crate::config::ColumnMapping;
use crate::error::{ForecastError, Result};
use crate::utils::parse_timestamp;
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Column key the model reads dates from
pub const DATE_KEY: &str = "ds";
/// Column key the model reads observed values from
pub const VALUE_KEY: &str = "y";

/// One observation of the history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Observation date
    pub ds: NaiveDateTime,
    /// Observed value; `None` for an empty cell
    pub y: Option<f64>,
}

impl InputRecord {
    pub fn new(ds: NaiveDateTime, y: f64) -> Self {
        Self { ds, y: Some(y) }
    }
}

/// Tabular sales data as read from disk
#[derive(Debug, Clone)]
pub struct SalesData {
    df: DataFrame,
}

/// Data loader for sales data
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load sales data from a CSV file with a header row.
    ///
    /// Every row must have as many fields as the header and every quoted
    /// field must be closed; otherwise the file is rejected before parsing.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<SalesData> {
        let bytes = fs::read(path)?;
        check_csv_structure(&bytes)?;

        let df = CsvReader::new(Cursor::new(bytes))
            .infer_schema(Some(100))
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Create sales data from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<SalesData> {
        if df.width() == 0 {
            return Err(ForecastError::DataError(
                "Data has no columns".to_string(),
            ));
        }

        Ok(SalesData { df })
    }
}

/// Reject ragged rows and unterminated quotes.
fn check_csv_structure(bytes: &[u8]) -> Result<()> {
    // Doubled quotes inside a quoted field keep the count even
    let quotes = bytes.iter().filter(|&&b| b == b'"').count();
    if quotes % 2 != 0 {
        return Err(ForecastError::CsvError(
            "EOF inside string: a quoted field is never closed".to_string(),
        ));
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);
    reader.headers()?;

    let mut record = ::csv::ByteRecord::new();
    while reader.read_byte_record(&mut record)? {}

    Ok(())
}

impl SalesData {
    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Rename the configured date and value columns to the model keys.
    ///
    /// Source columns that do not exist are skipped; the schema check
    /// reports what is still missing afterwards.
    pub fn rename_columns(&mut self, mapping: &ColumnMapping) -> Result<()> {
        for (source, target) in [(&mapping.date, DATE_KEY), (&mapping.value, VALUE_KEY)] {
            if source == target || !self.has_column(source) {
                continue;
            }
            if self.has_column(target) {
                return Err(ForecastError::DataError(format!(
                    "Cannot rename '{}' to '{}': a column named '{}' already exists",
                    source, target, target
                )));
            }
            self.df.rename(source, target)?;
        }

        Ok(())
    }

    /// Model keys that renaming would duplicate: both the configured source
    /// column and a column already named after the key are present
    pub fn rename_conflicts(&self, mapping: &ColumnMapping) -> Vec<String> {
        [(&mapping.date, DATE_KEY), (&mapping.value, VALUE_KEY)]
            .into_iter()
            .filter(|(source, target)| {
                source.as_str() != *target && self.has_column(source) && self.has_column(target)
            })
            .map(|(_, target)| target.to_string())
            .collect()
    }

    /// Model keys absent from the current schema
    pub fn missing_columns(&self) -> Vec<String> {
        [DATE_KEY, VALUE_KEY]
            .into_iter()
            .filter(|key| !self.has_column(key))
            .map(str::to_string)
            .collect()
    }

    fn has_column(&self, name: &str) -> bool {
        self.df.get_column_names().contains(&name)
    }

    /// Convert the renamed frame into history records, in file order
    pub fn to_history(&self) -> Result<Vec<InputRecord>> {
        let missing = self.missing_columns();
        if !missing.is_empty() {
            return Err(ForecastError::DataError(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )));
        }

        let dates = self.dates()?;
        let values = self.values()?;

        Ok(dates
            .into_iter()
            .zip(values)
            .map(|(ds, y)| InputRecord { ds, y })
            .collect())
    }

    /// Parse the date column; every row must hold a parseable date
    fn dates(&self) -> Result<Vec<NaiveDateTime>> {
        let column = self.df.column(DATE_KEY)?.cast(&DataType::Utf8)?;

        column
            .utf8()?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                Some(raw) => parse_timestamp(raw),
                None => Err(ForecastError::DataError(format!(
                    "Missing date in row {}",
                    row
                ))),
            })
            .collect()
    }

    /// Read the value column as floats; empty cells become `None`
    fn values(&self) -> Result<Vec<Option<f64>>> {
        let column = self
            .df
            .column(VALUE_KEY)?
            .strict_cast(&DataType::Float64)
            .map_err(|e| {
                ForecastError::DataError(format!("Column '{}' is not numeric: {}", VALUE_KEY, e))
            })?;

        let values: Vec<Option<f64>> = column.f64()?.into_iter().collect();
        Ok(values)
    }

    /// First `rows` rows rendered as a table
    pub fn head_preview(&self, rows: usize) -> String {
        format!("{}", self.df.head(Some(rows)))
    }

    /// Column names, dtypes and null counts
    pub fn info(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} rows, {} columns",
            self.df.height(),
            self.df.width()
        );
        for (idx, series) in self.df.get_columns().iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}  {:<16} {:<10} non-null: {}",
                idx,
                series.name(),
                series.dtype(),
                series.len() - series.null_count()
            );
        }
        out
    }
}
