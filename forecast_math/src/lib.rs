//! # Forecast Math
//!
//! Numerical building blocks for additive time series models.
//! This crate provides the pieces a trend + seasonality forecaster is
//! assembled from: penalised least squares, changepoint and Fourier bases,
//! and summary statistics over residuals and simulated samples.

use thiserror::Error;

pub mod changepoints;
pub mod fourier;
pub mod least_squares;
pub mod statistics;

/// Errors that can occur in forecasting calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;
