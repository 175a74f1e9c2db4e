//! Error types for the demand_forecast crate

use std::time::Duration;

use demand_math::MathError;
use stock_series::SeriesError;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    /// Not enough points to prepare or forecast a series
    #[error("Insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Malformed input series (off-cadence or unordered timestamps)
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Invalid caller-supplied parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Numeric computation failed
    #[error("Computation error: {0}")]
    Computation(String),

    /// Per-item computation exceeded the configured time budget
    #[error("Computation timed out after {0:?}")]
    ComputationTimeout(Duration),

    /// Error from the record store
    #[error("Record store error: {0}")]
    Store(SeriesError),

    /// Error from a statistical primitive
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<SeriesError> for ForecastError {
    fn from(err: SeriesError) -> Self {
        match err {
            // Ordering violations are malformed input, not store failures
            SeriesError::NonMonotonic(_) | SeriesError::DuplicateTimestamp(_) => {
                ForecastError::InvalidSeries(err.to_string())
            }
            other => ForecastError::Store(other),
        }
    }
}
