//! Candidate fitting, held-out scoring and winner selection

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ForecastError, Result};
use crate::metrics::forecast_accuracy;
use crate::models::arima::ArimaModel;
use crate::models::moving_average::MovingAverageModel;
use crate::models::seasonal::SeasonalTrendModel;
use crate::models::{CandidateFit, FittedModel, ModelForecast, ModelKind};
use crate::prepare::PreparedSeries;

/// Longest held-out tail reserved for scoring
const MAX_HOLDOUT: usize = 4;
/// Shortest series that still gets a held-out evaluation (one quarter of the
/// length rounds to zero below this); anything shorter selects by priority
/// order alone.
const MIN_SCORED_LENGTH: usize = 4;

/// Per-run knobs for the candidate set
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorConfig {
    /// Seasonal cycle length for the decomposition candidate
    pub season_length: usize,
    /// Trailing window for the moving-average baseline
    pub ma_window: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            season_length: 7,
            ma_window: 4,
        }
    }
}

/// Record of a candidate skipped for insufficient data.
///
/// Skips are recoverable: selection proceeds with the remaining candidates
/// and the record is carried into the final result for observability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSkip {
    /// Which candidate was skipped
    pub kind: ModelKind,
    /// Why it was skipped
    pub reason: String,
}

/// A candidate together with its held-out error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// Winning model kind
    pub kind: ModelKind,
    /// Display name including fitted parameters
    pub name: String,
    /// Held-out RMSE; None when the series was too short to score
    pub holdout_rmse: Option<f64>,
}

/// Selection output: the winning candidate and its full-series forecast
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    /// The chosen candidate
    pub winner: ScoredCandidate,
    /// Forecast from the winner re-fitted on the entire prepared series
    pub forecast: ModelForecast,
    /// Candidates skipped along the way
    pub skipped: Vec<ModelSkip>,
}

/// Fit every feasible candidate, score against a held-out tail, and forecast
/// the requested horizon with the winner re-fitted on the full series.
///
/// The held-out tail is the last `min(4, len / 4)` points (at least 1) when
/// the series is long enough to score; shorter series pick the highest
/// priority feasible candidate directly. Ties in held-out RMSE resolve by the
/// fixed priority order, so repeated runs over the same input always select
/// the same candidate.
pub fn select_and_forecast(
    series: &PreparedSeries,
    horizon: usize,
    config: &SelectorConfig,
) -> Result<SelectionOutcome> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "forecast horizon must be at least 1 period".to_string(),
        ));
    }

    let n = series.len();
    if n < 2 {
        return Err(ForecastError::InsufficientData { needed: 2, got: n });
    }

    let candidates = candidate_models(config)?;
    let mut skipped = Vec::new();

    let holdout = if n >= MIN_SCORED_LENGTH {
        MAX_HOLDOUT.min(n / 4).max(1)
    } else {
        0
    };

    let mut scored: Option<(usize, f64)> = None;
    if holdout > 0 {
        let prefix = series.truncated(n - holdout);
        let tail = &series.values()[n - holdout..];

        for (index, candidate) in candidates.iter().enumerate() {
            let fitted = match candidate.fit_boxed(&prefix) {
                Ok(fitted) => fitted,
                Err(ForecastError::InsufficientData { needed, got }) => {
                    record_skip(&mut skipped, candidate.kind(), needed, got);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let rmse = forecast_accuracy(&fitted.forecast(holdout)?.points(), tail)?.rmse;
            debug!(
                model = candidate.kind().label(),
                rmse, holdout, "scored candidate"
            );

            // Strict improvement only: ties keep the higher-priority incumbent
            match scored {
                None => scored = Some((index, rmse)),
                Some((_, best)) if rmse < best => scored = Some((index, rmse)),
                Some(_) => {}
            }
        }
    }

    let (fitted, holdout_rmse): (Box<dyn FittedModel>, Option<f64>) = match scored {
        Some((index, rmse)) => (candidates[index].fit_boxed(series)?, Some(rmse)),
        None => {
            // No scoring possible: take the first candidate feasible on the
            // full series, in priority order.
            let mut chosen = None;
            for candidate in &candidates {
                match candidate.fit_boxed(series) {
                    Ok(fitted) => {
                        chosen = Some(fitted);
                        break;
                    }
                    Err(ForecastError::InsufficientData { needed, got }) => {
                        record_skip(&mut skipped, candidate.kind(), needed, got);
                    }
                    Err(e) => return Err(e),
                }
            }

            match chosen {
                Some(fitted) => (fitted, None),
                None => return Err(ForecastError::InsufficientData { needed: 2, got: n }),
            }
        }
    };

    let forecast = fitted.forecast(horizon)?;
    debug!(model = %fitted.name(), horizon, "selected forecast model");

    Ok(SelectionOutcome {
        winner: ScoredCandidate {
            kind: fitted.kind(),
            name: fitted.name(),
            holdout_rmse,
        },
        forecast,
        skipped,
    })
}

/// The candidate list in fixed priority order
fn candidate_models(config: &SelectorConfig) -> Result<Vec<Box<dyn CandidateFit>>> {
    Ok(vec![
        Box::new(SeasonalTrendModel::new(config.season_length)?),
        Box::new(ArimaModel::new()),
        Box::new(MovingAverageModel::new(config.ma_window)?),
    ])
}

fn record_skip(skipped: &mut Vec<ModelSkip>, kind: ModelKind, needed: usize, got: usize) {
    let reason = format!("needs at least {} points, series has {}", needed, got);
    warn!(model = kind.label(), %reason, "candidate skipped");
    skipped.push(ModelSkip { kind, reason });
}
