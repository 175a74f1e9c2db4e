//! # Stock Series
//!
//! `stock_series` provides the consumption-history record types shared by the
//! demand forecasting crates, together with the record-store seam the engine
//! reads from.
//!
//! The central types are:
//!
//! - [`ConsumptionRecord`] / [`ConsumptionSeries`]: one item's ordered
//!   consumption history. Ordering is enforced at construction, so downstream
//!   code can rely on strictly increasing dates.
//! - [`Cadence`]: the nominal spacing between consecutive points (weekly by
//!   default) with the grid arithmetic the preparer needs.
//! - [`RecordStore`]: the narrow interface a persistence layer implements to
//!   hand series and stock levels to the engine. [`InMemoryStore`] is the
//!   bundled implementation used by tests and tools.
//!
//! ## Usage Example
//!
//! ```
//! use chrono::NaiveDate;
//! use stock_series::{ConsumptionSeries, InMemoryStore, RecordStore};
//!
//! let series = ConsumptionSeries::from_pairs(vec![
//!     (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 12.0),
//!     (NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(), 15.0),
//! ])
//! .unwrap();
//!
//! let store = InMemoryStore::new()
//!     .with_series("paracetamol", series)
//!     .with_stock("paracetamol", 140.0);
//!
//! let history = store.get_series("paracetamol", None).unwrap();
//! assert_eq!(history.len(), 2);
//! ```

use thiserror::Error;

pub mod records;
pub mod store;
pub mod utils;

pub use records::{Cadence, ConsumptionRecord, ConsumptionSeries};
pub use store::{InMemoryStore, RecordStore};

/// Errors that can occur while building or retrieving consumption series
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// Timestamps are not strictly increasing
    #[error("Non-monotonic series: {0}")]
    NonMonotonic(String),

    /// Two records share the same timestamp
    #[error("Duplicate timestamp: {0}")]
    DuplicateTimestamp(String),

    /// The requested item has no data in the store
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// A cadence was constructed with an unusable step
    #[error("Invalid cadence: {0}")]
    InvalidCadence(String),

    /// Reading or parsing external data failed
    #[error("Data loading error: {0}")]
    DataLoad(String),
}

/// Result type for series operations
pub type Result<T> = std::result::Result<T, SeriesError>;
