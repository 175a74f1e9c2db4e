//! Consumption record types and cadence arithmetic

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Result, SeriesError};

/// A single consumption observation for one item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Date of the observation
    pub date: NaiveDate,
    /// Quantity consumed in the period ending at `date`
    pub quantity: f64,
}

impl ConsumptionRecord {
    /// Create a new consumption record
    pub fn new(date: NaiveDate, quantity: f64) -> Self {
        Self { date, quantity }
    }
}

/// One item's consumption history, ordered by date.
///
/// Construction validates that dates are strictly increasing; every accessor
/// can therefore assume ordering. The series is read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionSeries {
    records: Vec<ConsumptionRecord>,
}

impl ConsumptionSeries {
    /// Build a series from ordered records.
    ///
    /// Fails with [`SeriesError::DuplicateTimestamp`] or
    /// [`SeriesError::NonMonotonic`] when the ordering invariant is violated.
    pub fn new(records: Vec<ConsumptionRecord>) -> Result<Self> {
        for pair in records.windows(2) {
            if pair[1].date == pair[0].date {
                return Err(SeriesError::DuplicateTimestamp(format!(
                    "two records dated {}",
                    pair[0].date
                )));
            }
            if pair[1].date < pair[0].date {
                return Err(SeriesError::NonMonotonic(format!(
                    "{} follows {}",
                    pair[1].date, pair[0].date
                )));
            }
        }

        Ok(Self { records })
    }

    /// Build a series from (date, quantity) pairs
    pub fn from_pairs(pairs: Vec<(NaiveDate, f64)>) -> Result<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, quantity)| ConsumptionRecord::new(date, quantity))
                .collect(),
        )
    }

    /// Number of records in the series
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the series has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in date order
    pub fn records(&self) -> &[ConsumptionRecord] {
        &self.records
    }

    /// Quantities in date order
    pub fn quantities(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.quantity).collect()
    }

    /// Dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// Earliest record, if any
    pub fn first(&self) -> Option<&ConsumptionRecord> {
        self.records.first()
    }

    /// Latest record, if any
    pub fn last(&self) -> Option<&ConsumptionRecord> {
        self.records.last()
    }

    /// A copy of the series restricted to records on or after `date`
    pub fn since(&self, date: NaiveDate) -> Self {
        Self {
            records: self
                .records
                .iter()
                .copied()
                .filter(|r| r.date >= date)
                .collect(),
        }
    }
}

/// Nominal fixed spacing between consecutive series points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    days: u32,
}

impl Cadence {
    /// Create a cadence with the given step in days
    pub fn new(days: u32) -> Result<Self> {
        if days == 0 {
            return Err(SeriesError::InvalidCadence(
                "step must be at least one day".to_string(),
            ));
        }
        Ok(Self { days })
    }

    /// Weekly cadence (7-day steps)
    pub fn weekly() -> Self {
        Self { days: 7 }
    }

    /// Daily cadence (1-day steps)
    pub fn daily() -> Self {
        Self { days: 1 }
    }

    /// Step length in days
    pub fn days(&self) -> u32 {
        self.days
    }

    /// The date one cadence step after `date`
    pub fn step(&self, date: NaiveDate) -> NaiveDate {
        date + Duration::days(i64::from(self.days))
    }

    /// Whole cadence steps from `start` to `end`, or None when `end` does not
    /// fall on the grid anchored at `start`.
    pub fn periods_between(&self, start: NaiveDate, end: NaiveDate) -> Option<u64> {
        let delta = (end - start).num_days();
        if delta < 0 || delta % i64::from(self.days) != 0 {
            return None;
        }
        Some((delta / i64::from(self.days)) as u64)
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::weekly()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn series_accepts_increasing_dates() {
        let series = ConsumptionSeries::from_pairs(vec![
            (date(2024, 1, 1), 5.0),
            (date(2024, 1, 8), 7.0),
            (date(2024, 1, 15), 6.0),
        ])
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.quantities(), vec![5.0, 7.0, 6.0]);
        assert_eq!(series.first().unwrap().date, date(2024, 1, 1));
        assert_eq!(series.last().unwrap().date, date(2024, 1, 15));
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let result = ConsumptionSeries::from_pairs(vec![
            (date(2024, 1, 1), 5.0),
            (date(2024, 1, 1), 7.0),
        ]);

        assert!(matches!(result, Err(SeriesError::DuplicateTimestamp(_))));
    }

    #[test]
    fn series_rejects_out_of_order_dates() {
        let result = ConsumptionSeries::from_pairs(vec![
            (date(2024, 1, 8), 5.0),
            (date(2024, 1, 1), 7.0),
        ]);

        assert!(matches!(result, Err(SeriesError::NonMonotonic(_))));
    }

    #[test]
    fn since_filters_older_records() {
        let series = ConsumptionSeries::from_pairs(vec![
            (date(2024, 1, 1), 5.0),
            (date(2024, 1, 8), 7.0),
            (date(2024, 1, 15), 6.0),
        ])
        .unwrap();

        let recent = series.since(date(2024, 1, 8));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent.first().unwrap().date, date(2024, 1, 8));
    }

    #[test]
    fn cadence_step_and_alignment() {
        let cadence = Cadence::weekly();
        assert_eq!(cadence.step(date(2024, 1, 1)), date(2024, 1, 8));
        assert_eq!(
            cadence.periods_between(date(2024, 1, 1), date(2024, 1, 29)),
            Some(4)
        );
        assert_eq!(cadence.periods_between(date(2024, 1, 1), date(2024, 1, 10)), None);
        assert_eq!(cadence.periods_between(date(2024, 1, 8), date(2024, 1, 1)), None);
    }

    #[test]
    fn cadence_rejects_zero_step() {
        assert!(matches!(Cadence::new(0), Err(SeriesError::InvalidCadence(_))));
    }
}
