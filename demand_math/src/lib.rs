//! # Demand Math
//!
//! Statistical primitives shared by the demand forecasting crates.
//! This crate knows nothing about items or stock levels; it works on plain
//! `f64` slices and windows.

use thiserror::Error;

pub mod regression;
pub mod rolling;
pub mod stats;

pub use regression::{fit_line, ols, LinearFit};
pub use rolling::RollingWindow;
pub use stats::{difference, mean, sample_std, sample_variance};

/// Errors that can occur in statistical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for math operations
pub type Result<T> = std::result::Result<T, MathError>;
