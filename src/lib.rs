//! # Sales Forecast Workspace
//!
//! Umbrella crate re-exporting the workspace members:
//!
//! - [`sales_forecast`]: data loading, the forecasting model and the runner
//! - [`forecast_math`]: least squares, changepoint and Fourier bases, statistics
//!
//! ## Example
//!
//! ```no_run
//! use sales_forecast_workspace::sales_forecast::{ForecastRunner, RunConfig};
//!
//! let outcome = ForecastRunner::new(RunConfig::from_current_dir()?)?.run()?;
//! println!("{}", outcome);
//! # Ok::<(), sales_forecast_workspace::sales_forecast::ForecastError>(())
//! ```

pub use forecast_math;
pub use sales_forecast;
