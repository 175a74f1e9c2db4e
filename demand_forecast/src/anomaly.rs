//! Consumption anomaly scoring
//!
//! Rolling z-score against a trailing baseline. Each point is compared with
//! the mean and spread of the window immediately preceding it; the flagging
//! threshold is derived from a 0..=100 sensitivity so callers can tune how
//! aggressive detection is without touching the scoring itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use demand_math::RollingWindow;

use crate::error::{ForecastError, Result};
use crate::prepare::PreparedSeries;

/// Sentinel deviation for a non-zero gap over a zero-variance baseline.
/// Finite so reports serialize cleanly, far above any reachable threshold.
pub const MAX_DEVIATION_SCORE: f64 = 1.0e6;

/// Baseline window when the series is long enough
const LONG_WINDOW: usize = 8;
/// Baseline window for short series
const SHORT_WINDOW: usize = 4;
/// Series length at which the long window kicks in
const LONG_WINDOW_THRESHOLD: usize = 16;

/// One scored observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPoint {
    /// Date of the observation
    pub date: NaiveDate,
    /// Observed quantity
    pub actual: f64,
    /// Rolling-baseline expectation
    pub expected: f64,
    /// Standardized deviation from the baseline
    pub deviation: f64,
    /// Whether the deviation exceeded the sensitivity threshold
    pub flagged: bool,
}

/// Anomaly scoring output for one item, produced fresh per call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Item the report covers
    pub item_id: String,
    /// Sensitivity the report was produced with
    pub sensitivity: u8,
    /// Threshold derived from the sensitivity
    pub threshold: f64,
    /// Scored points in date order
    pub points: Vec<AnomalyPoint>,
    /// Number of flagged points
    pub flagged_count: usize,
    /// Largest deviation among scored points
    pub max_deviation: f64,
    /// Mean deviation across scored points
    pub mean_deviation: f64,
}

impl AnomalyReport {
    /// Assemble a report from scored points
    pub fn from_points(
        item_id: impl Into<String>,
        sensitivity: u8,
        points: Vec<AnomalyPoint>,
    ) -> Self {
        let flagged_count = points.iter().filter(|p| p.flagged).count();
        let max_deviation = points.iter().map(|p| p.deviation).fold(0.0, f64::max);
        let mean_deviation = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|p| p.deviation).sum::<f64>() / points.len() as f64
        };

        Self {
            item_id: item_id.into(),
            sensitivity,
            threshold: sensitivity_threshold(sensitivity),
            points,
            flagged_count,
            max_deviation,
            mean_deviation,
        }
    }

    /// Serialize to a JSON string for transport layers
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ForecastError::Computation(format!("serialization failed: {}", e)))
    }
}

/// Flagging threshold for a sensitivity in 0..=100.
///
/// Higher sensitivity lowers the threshold, so the flagged set only ever
/// grows as sensitivity rises.
pub fn sensitivity_threshold(sensitivity: u8) -> f64 {
    (3.0 - f64::from(sensitivity) / 50.0).max(0.5)
}

/// Score a prepared series against its rolling baseline.
///
/// Points without a full window of preceding history are not scored, and
/// imputed points are never scored or flagged (they still feed the baseline:
/// they are the best available history for their slot). The result holds
/// scored points only.
pub fn score_series(series: &PreparedSeries, sensitivity: u8) -> Result<Vec<AnomalyPoint>> {
    if sensitivity > 100 {
        return Err(ForecastError::InvalidParameter(format!(
            "sensitivity must be in 0..=100, got {}",
            sensitivity
        )));
    }

    let values = series.values();
    let dates = series.dates();
    let threshold = sensitivity_threshold(sensitivity);

    let window = if values.len() >= LONG_WINDOW_THRESHOLD {
        LONG_WINDOW
    } else {
        SHORT_WINDOW
    };

    let mut baseline = RollingWindow::new(window)?;
    let mut points = Vec::new();

    for (index, &actual) in values.iter().enumerate() {
        if baseline.is_full() && !series.is_imputed(index) {
            let expected = baseline.mean()?;
            let spread = baseline.sample_std()?;
            let gap = (actual - expected).abs();

            let deviation = if spread > f64::EPSILON {
                gap / spread
            } else if gap > f64::EPSILON {
                MAX_DEVIATION_SCORE
            } else {
                0.0
            };

            points.push(AnomalyPoint {
                date: dates[index],
                actual,
                expected,
                deviation,
                flagged: deviation > threshold,
            });
        }

        baseline.push(actual);
    }

    Ok(points)
}
