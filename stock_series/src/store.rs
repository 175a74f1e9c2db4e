//! Record-store access for consumption history and stock levels

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::records::ConsumptionSeries;
use crate::{Result, SeriesError};

/// Narrow interface a persistence layer implements for the forecasting engine.
///
/// Implementations return owned data; the engine never writes back through
/// this trait.
pub trait RecordStore {
    /// Ordered consumption series for one item, optionally restricted to
    /// records on or after `since`. The returned series may contain gaps.
    fn get_series(&self, item_id: &str, since: Option<NaiveDate>) -> Result<ConsumptionSeries>;

    /// Current on-hand stock for one item
    fn get_current_stock(&self, item_id: &str) -> Result<f64>;
}

/// In-memory record store backed by ordered maps.
///
/// Used by tests and tools; a database-backed implementation would satisfy
/// the same trait.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    series: BTreeMap<String, ConsumptionSeries>,
    stock: BTreeMap<String, f64>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: add a consumption series for an item
    pub fn with_series(mut self, item_id: impl Into<String>, series: ConsumptionSeries) -> Self {
        self.series.insert(item_id.into(), series);
        self
    }

    /// Builder-style: set the current stock level for an item
    pub fn with_stock(mut self, item_id: impl Into<String>, quantity: f64) -> Self {
        self.stock.insert(item_id.into(), quantity);
        self
    }

    /// Add or replace a consumption series
    pub fn insert_series(&mut self, item_id: impl Into<String>, series: ConsumptionSeries) {
        self.series.insert(item_id.into(), series);
    }

    /// Set the current stock level
    pub fn insert_stock(&mut self, item_id: impl Into<String>, quantity: f64) {
        self.stock.insert(item_id.into(), quantity);
    }

    /// All item ids with a stored series, in sorted order
    pub fn item_ids(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }
}

impl RecordStore for InMemoryStore {
    fn get_series(&self, item_id: &str, since: Option<NaiveDate>) -> Result<ConsumptionSeries> {
        let series = self
            .series
            .get(item_id)
            .ok_or_else(|| SeriesError::UnknownItem(item_id.to_string()))?;

        Ok(match since {
            Some(date) => series.since(date),
            None => series.clone(),
        })
    }

    fn get_current_stock(&self, item_id: &str) -> Result<f64> {
        self.stock
            .get(item_id)
            .copied()
            .ok_or_else(|| SeriesError::UnknownItem(item_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_series() -> ConsumptionSeries {
        ConsumptionSeries::from_pairs(vec![
            (date(2024, 1, 1), 5.0),
            (date(2024, 1, 8), 7.0),
            (date(2024, 1, 15), 6.0),
        ])
        .unwrap()
    }

    #[test]
    fn store_returns_full_series() {
        let store = InMemoryStore::new().with_series("ibuprofen", sample_series());

        let series = store.get_series("ibuprofen", None).unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn store_applies_since_filter() {
        let store = InMemoryStore::new().with_series("ibuprofen", sample_series());

        let series = store.get_series("ibuprofen", Some(date(2024, 1, 8))).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn store_reports_unknown_items() {
        let store = InMemoryStore::new();

        assert!(matches!(
            store.get_series("missing", None),
            Err(SeriesError::UnknownItem(_))
        ));
        assert!(matches!(
            store.get_current_stock("missing"),
            Err(SeriesError::UnknownItem(_))
        ));
    }

    #[test]
    fn store_returns_stock_levels() {
        let store = InMemoryStore::new().with_stock("ibuprofen", 42.5);

        assert_eq!(store.get_current_stock("ibuprofen").unwrap(), 42.5);
    }
}
