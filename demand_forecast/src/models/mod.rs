//! Candidate forecasting models
//!
//! Every candidate exposes the same two-step interface: an unfitted model is
//! `fit` to a prepared series and the resulting fitted model produces a
//! bounded forecast for a horizon. Selection logic only ever talks to these
//! traits; the one place concrete kinds appear is the fixed tie-break
//! priority table.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{ForecastError, Result};
use crate::prepare::PreparedSeries;

pub mod arima;
pub mod moving_average;
pub mod seasonal;

/// Confidence level used for forecast interval widths
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Identity of a candidate model kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Trend plus seasonal decomposition
    SeasonalTrend,
    /// Autoregressive integrated model
    Arima,
    /// Trailing moving-average baseline
    MovingAverage,
}

/// Fixed tie-break order: earlier entries win ties.
///
/// An explicit ordered list so selection stays deterministic without any
/// kind-specific dispatch.
pub const MODEL_PRIORITY: [ModelKind; 3] = [
    ModelKind::SeasonalTrend,
    ModelKind::Arima,
    ModelKind::MovingAverage,
];

impl ModelKind {
    /// Position in the tie-break table (lower wins ties)
    pub fn priority(self) -> usize {
        MODEL_PRIORITY
            .iter()
            .position(|&kind| kind == self)
            .unwrap_or(MODEL_PRIORITY.len())
    }

    /// Short display label
    pub fn label(self) -> &'static str {
        match self {
            ModelKind::SeasonalTrend => "Seasonal Trend",
            ModelKind::Arima => "ARIMA",
            ModelKind::MovingAverage => "Moving Average",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One forecast step: point estimate with lower/upper confidence bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastInterval {
    /// Point estimate
    pub point: f64,
    /// Lower confidence bound
    pub lower: f64,
    /// Upper confidence bound
    pub upper: f64,
}

/// A bounded multi-step forecast produced by a fitted model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecast {
    steps: Vec<ForecastInterval>,
}

impl ModelForecast {
    /// Create a forecast, validating that every step is finite and ordered
    /// lower <= point <= upper.
    pub fn new(steps: Vec<ForecastInterval>) -> Result<Self> {
        for (i, step) in steps.iter().enumerate() {
            if !(step.point.is_finite() && step.lower.is_finite() && step.upper.is_finite()) {
                return Err(ForecastError::Computation(format!(
                    "non-finite forecast value at step {}",
                    i + 1
                )));
            }
            if step.lower > step.point || step.point > step.upper {
                return Err(ForecastError::Computation(format!(
                    "unordered bounds at step {}: {} <= {} <= {} violated",
                    i + 1,
                    step.lower,
                    step.point,
                    step.upper
                )));
            }
        }

        Ok(Self { steps })
    }

    /// Number of forecast steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check whether the forecast has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The forecast steps in order
    pub fn steps(&self) -> &[ForecastInterval] {
        &self.steps
    }

    /// Point estimates only
    pub fn points(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.point).collect()
    }
}

/// Forecast model that can be fitted to a prepared series
pub trait ForecastModel {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model to the prepared series
    fn fit(&self, series: &PreparedSeries) -> Result<Self::Fitted>;

    /// Kind of this model
    fn kind(&self) -> ModelKind;
}

/// A fitted model ready to forecast
pub trait FittedModel {
    /// Generate a bounded forecast for the given horizon
    fn forecast(&self, horizon: usize) -> Result<ModelForecast>;

    /// Kind of this model
    fn kind(&self) -> ModelKind;

    /// Display name including fitted parameters
    fn name(&self) -> String;
}

/// Object-safe candidate used by the selector to treat all model kinds
/// uniformly.
pub(crate) trait CandidateFit {
    fn kind(&self) -> ModelKind;
    fn fit_boxed(&self, series: &PreparedSeries) -> Result<Box<dyn FittedModel>>;
}

impl<M> CandidateFit for M
where
    M: ForecastModel,
    M::Fitted: 'static,
{
    fn kind(&self) -> ModelKind {
        ForecastModel::kind(self)
    }

    fn fit_boxed(&self, series: &PreparedSeries) -> Result<Box<dyn FittedModel>> {
        Ok(Box::new(self.fit(series)?))
    }
}

/// Two-sided standard normal quantile for the given confidence level
pub(crate) fn interval_z(level: f64) -> Result<f64> {
    if !(0.0..1.0).contains(&level) {
        return Err(ForecastError::InvalidParameter(format!(
            "confidence level must be in (0, 1), got {}",
            level
        )));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::Computation(format!("normal distribution: {}", e)))?;

    Ok(normal.inverse_cdf(0.5 + level / 2.0))
}
