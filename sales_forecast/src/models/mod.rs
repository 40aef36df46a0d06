//! Forecasting models for sales time series

use crate::data::InputRecord;
use crate::error::Result;
use crate::forecast::ForecastFrame;
use chrono::NaiveDateTime;
use std::fmt::Debug;

/// Fitted forecast model
pub trait FittedModel: Debug {
    /// History dates followed by `periods` dates past the last observation,
    /// spaced at the frequency inferred during fitting
    fn make_future_dates(&self, periods: usize) -> Result<Vec<NaiveDateTime>>;

    /// Predict point estimates and bounds for each date
    fn predict(&self, dates: &[NaiveDateTime]) -> Result<ForecastFrame>;

    /// Name of the model
    fn name(&self) -> &str;

    /// Predict over the history extended by `periods` future dates
    fn forecast(&self, periods: usize) -> Result<ForecastFrame> {
        let dates = self.make_future_dates(periods)?;
        self.predict(&dates)
    }
}

/// Forecast model that can be fitted to a sales history
pub trait ForecastModel: Debug {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model to the full history
    fn fit(&self, history: &[InputRecord]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod prophet;
pub mod seasonality;
pub mod uncertainty;

pub use prophet::{FittedProphet, Prophet};
