//! # Sales Forecast
//!
//! Fit an additive trend + seasonality model to a sales series and write the
//! forecast back to CSV.
//!
//! ## Features
//!
//! - CSV loading with column renaming and a schema check
//! - Piecewise-linear trend with automatic changepoints
//! - Yearly, weekly and daily Fourier seasonalities, switched on from the data
//! - Simulated uncertainty intervals
//! - Future dates at the spacing inferred from the history
//!
//! ## Quick Start
//!
//! ```no_run
//! use sales_forecast::{ForecastRunner, RunConfig, RunOutcome};
//!
//! // Reads data/cleaned_sales.csv, writes data/sales_forecast.csv
//! let runner = ForecastRunner::new(RunConfig::in_dir("."))?;
//!
//! match runner.run()? {
//!     RunOutcome::Completed { rows, .. } => println!("wrote {} rows", rows),
//!     other => println!("{}", other),
//! }
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```
//!
//! The model can be used without the runner:
//!
//! ```
//! use chrono::NaiveDate;
//! use sales_forecast::data::InputRecord;
//! use sales_forecast::models::{FittedModel, ForecastModel, Prophet};
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let history: Vec<InputRecord> = (0..10)
//!     .map(|d| InputRecord::new(start + chrono::Duration::days(d), 100.0 + d as f64))
//!     .collect();
//!
//! let fitted = Prophet::default().fit(&history)?;
//! let forecast = fitted.forecast(5)?;
//! assert_eq!(forecast.len(), 15);
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod forecast;
pub mod models;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use crate::cli::Cli;
pub use crate::config::{ColumnMapping, ProphetConfig, RunConfig};
pub use crate::data::{DataLoader, InputRecord, SalesData};
pub use crate::error::ForecastError;
pub use crate::forecast::{ForecastFrame, ForecastRecord};
pub use crate::models::{FittedModel, ForecastModel, Prophet};
pub use crate::runner::{ForecastRunner, RunOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
