//! Series preparation: uniform time index, gap imputation, value clipping

use std::collections::BTreeMap;

use chrono::NaiveDate;

use stock_series::{Cadence, ConsumptionSeries};

use crate::error::{ForecastError, Result};

/// A consumption series on a complete, uniform cadence grid.
///
/// Every downstream component consumes this form. Each point is either an
/// original observation or explicitly marked imputed; nothing synthetic is
/// ever left unmarked.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    imputed: Vec<bool>,
    cadence: Cadence,
}

impl PreparedSeries {
    /// Number of grid points
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the series has no points
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values on the uniform grid
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Grid dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Imputation flags, aligned with `values`
    pub fn imputed(&self) -> &[bool] {
        &self.imputed
    }

    /// Check whether the point at `index` was imputed
    pub fn is_imputed(&self, index: usize) -> bool {
        self.imputed.get(index).copied().unwrap_or(false)
    }

    /// Number of points carrying an observed (non-imputed) value
    pub fn observed_count(&self) -> usize {
        self.imputed.iter().filter(|&&flag| !flag).count()
    }

    /// The cadence the grid was built on
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Date of the last grid point
    pub fn last_date(&self) -> NaiveDate {
        // Construction guarantees at least 2 points
        self.dates[self.dates.len() - 1]
    }

    /// A copy of the first `len` grid points, used for held-out evaluation
    pub fn truncated(&self, len: usize) -> PreparedSeries {
        let len = len.min(self.len());
        PreparedSeries {
            dates: self.dates[..len].to_vec(),
            values: self.values[..len].to_vec(),
            imputed: self.imputed[..len].to_vec(),
            cadence: self.cadence,
        }
    }
}

/// Clean a raw consumption series onto a uniform cadence grid.
///
/// The grid runs from the first to the last observed date in steps of
/// `cadence`. Missing steps are imputed with the mean of the two adjacent
/// observed values (or the single observed neighbor at a boundary). Negative
/// quantities are clamped to zero and recorded as imputed so the anomaly
/// scorer can skip them.
///
/// Fails with `InsufficientData` when fewer than 2 observations exist and
/// with `InvalidSeries` when an observation does not fall on the cadence
/// grid anchored at the first observation.
pub fn prepare_series(series: &ConsumptionSeries, cadence: Cadence) -> Result<PreparedSeries> {
    let records = series.records();
    if records.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: records.len(),
        });
    }

    let first = records[0].date;

    // Observed quantities keyed by grid offset, clamped at zero
    let mut observed: BTreeMap<usize, (f64, bool)> = BTreeMap::new();
    for record in records {
        let offset = cadence.periods_between(first, record.date).ok_or_else(|| {
            ForecastError::InvalidSeries(format!(
                "observation at {} is off the {}-day cadence grid starting {}",
                record.date,
                cadence.days(),
                first
            ))
        })? as usize;

        let clamped = record.quantity < 0.0;
        let value = if clamped { 0.0 } else { record.quantity };
        observed.insert(offset, (value, clamped));
    }

    let total = match observed.keys().next_back() {
        Some(&last_offset) => last_offset + 1,
        None => 0,
    };

    let mut dates = Vec::with_capacity(total);
    let mut values = Vec::with_capacity(total);
    let mut imputed = Vec::with_capacity(total);

    let mut date = first;
    for index in 0..total {
        let (value, was_imputed) = match observed.get(&index) {
            Some(&(value, clamped)) => (value, clamped),
            None => (impute_gap(&observed, index)?, true),
        };

        dates.push(date);
        values.push(value);
        imputed.push(was_imputed);
        date = cadence.step(date);
    }

    Ok(PreparedSeries {
        dates,
        values,
        imputed,
        cadence,
    })
}

/// Mean of the observed neighbors around a missing grid slot
fn impute_gap(observed: &BTreeMap<usize, (f64, bool)>, index: usize) -> Result<f64> {
    let before = observed.range(..index).next_back().map(|(_, &(v, _))| v);
    let after = observed.range(index + 1..).next().map(|(_, &(v, _))| v);

    match (before, after) {
        (Some(prev), Some(next)) => Ok((prev + next) / 2.0),
        (Some(only), None) | (None, Some(only)) => Ok(only),
        (None, None) => Err(ForecastError::InsufficientData { needed: 1, got: 0 }),
    }
}
