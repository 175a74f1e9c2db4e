//! # Demand Forecast
//!
//! A Rust library for per-item demand forecasting with automatic model
//! selection and consumption anomaly detection.
//!
//! ## Features
//!
//! - Series preparation: uniform cadence grid, explicit gap imputation,
//!   negative-value clipping
//! - Candidate models (seasonal/trend decomposition, ARIMA, moving-average
//!   baseline) behind one fit/forecast interface
//! - Held-out evaluation: candidates are scored by RMSE on a reserved tail
//!   and the winner is re-fitted on the full series
//! - Rolling z-score anomaly detection with a tunable 0..=100 sensitivity
//! - Stockout projection with lead-time risk grading
//! - Bulk processing with per-item failure isolation and an optional
//!   per-item timeout
//!
//! Every computation is a pure, deterministic function of the supplied
//! series: the same history and horizon always produce the same forecast.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use demand_forecast::{ForecastEngine, Result};
//! use stock_series::{ConsumptionSeries, InMemoryStore};
//!
//! fn main() -> Result<()> {
//!     let series = ConsumptionSeries::from_pairs(
//!         (0..12)
//!             .map(|week| {
//!                 let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
//!                     + chrono::Duration::weeks(week);
//!                 (date, 20.0 + week as f64)
//!             })
//!             .collect(),
//!     )?;
//!
//!     let store = InMemoryStore::new()
//!         .with_series("paracetamol", series)
//!         .with_stock("paracetamol", 150.0);
//!
//!     let engine = ForecastEngine::new(store);
//!
//!     // Forecast 4 weeks ahead with a stockout projection
//!     let forecast = engine.forecast("paracetamol", 4, None)?;
//!     println!("{} via {}", forecast.item_id, forecast.model_name);
//!
//!     // Flag unusual consumption at high sensitivity
//!     let report = engine.detect_anomalies("paracetamol", 80)?;
//!     println!("{} anomalies", report.flagged_count);
//!
//!     Ok(())
//! }
//! ```

pub mod anomaly;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod prepare;
pub mod result;
pub mod selection;

// Re-export commonly used types
pub use crate::anomaly::{
    score_series, sensitivity_threshold, AnomalyPoint, AnomalyReport, MAX_DEVIATION_SCORE,
};
pub use crate::engine::{EngineConfig, ForecastEngine, MIN_FORECAST_POINTS};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::{forecast_accuracy, ForecastAccuracy};
pub use crate::models::{
    FittedModel, ForecastInterval, ForecastModel, ModelForecast, ModelKind, MODEL_PRIORITY,
};
pub use crate::prepare::{prepare_series, PreparedSeries};
pub use crate::result::{
    ForecastPeriod, ForecastResult, StockoutPeriod, StockoutProjection, StockoutRisk,
};
pub use crate::selection::{
    select_and_forecast, ModelSkip, ScoredCandidate, SelectionOutcome, SelectorConfig,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
