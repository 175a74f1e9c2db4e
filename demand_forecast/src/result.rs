//! Forecast result assembly: dated periods, stockout projection, risk grading

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stock_series::Cadence;

use crate::prepare::PreparedSeries;
use crate::selection::{ModelSkip, SelectionOutcome};

/// Days of cover below which a stockout is graded Medium rather than Low
const MEDIUM_RISK_DAYS: u32 = 30;

/// One forecast period with confidence bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    /// Date the period ends on
    pub period: NaiveDate,
    /// Point estimate
    pub point: f64,
    /// Lower confidence bound
    pub lower: f64,
    /// Upper confidence bound
    pub upper: f64,
}

/// When cumulative forecast consumption first exceeds current stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockoutPeriod {
    /// 1-based forecast period of the projected stockout
    AtPeriod(usize),
    /// Stock covers the whole forecast horizon
    BeyondHorizon,
}

/// How urgent the projected stockout is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockoutRisk {
    Critical,
    High,
    Medium,
    Low,
}

/// Stockout projection for a known stock level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockoutProjection {
    /// Stock level the projection was computed against
    pub current_stock: f64,
    /// First period at which cumulative consumption exceeds stock
    pub period: StockoutPeriod,
    /// Date of that period, when within the horizon
    pub date: Option<NaiveDate>,
    /// Urgency relative to the replenishment lead time
    pub risk: StockoutRisk,
}

/// Final packaged forecast for one item.
///
/// Immutable once produced; the field names are the contract any transport
/// serialization must preserve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Item the forecast covers
    pub item_id: String,
    /// Name of the chosen model, including fitted parameters
    pub model_name: String,
    /// Number of forecast periods
    pub horizon: usize,
    /// Forecast periods in date order
    pub periods: Vec<ForecastPeriod>,
    /// Held-out RMSE of the chosen model; None when the series was too short
    /// to score
    pub holdout_rmse: Option<f64>,
    /// Stockout projection; None when no stock level was available
    pub stockout: Option<StockoutProjection>,
    /// Candidates skipped during selection
    pub skipped: Vec<ModelSkip>,
}

impl ForecastResult {
    /// Serialize to a JSON string for transport layers
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::error::ForecastError::Computation(format!("serialization failed: {}", e)))
    }
}

/// Package a selection outcome into the final per-item result.
///
/// Period dates continue the prepared grid from its last observation.
/// Points and bounds are clamped at zero (demand cannot go negative); the
/// clamp is monotone, so the bound ordering survives it.
pub fn assemble_result(
    item_id: &str,
    series: &PreparedSeries,
    outcome: SelectionOutcome,
    current_stock: Option<f64>,
    lead_time_periods: usize,
) -> ForecastResult {
    let cadence = series.cadence();

    let mut date = series.last_date();
    let mut periods = Vec::with_capacity(outcome.forecast.len());
    for step in outcome.forecast.steps() {
        date = cadence.step(date);
        periods.push(ForecastPeriod {
            period: date,
            point: step.point.max(0.0),
            lower: step.lower.max(0.0),
            upper: step.upper.max(0.0),
        });
    }

    let stockout =
        current_stock.map(|stock| project_stockout(&periods, stock, lead_time_periods, cadence));

    ForecastResult {
        item_id: item_id.to_string(),
        model_name: outcome.winner.name,
        horizon: periods.len(),
        periods,
        holdout_rmse: outcome.winner.holdout_rmse,
        stockout,
        skipped: outcome.skipped,
    }
}

/// Walk the cumulative point forecast against the stock level
fn project_stockout(
    periods: &[ForecastPeriod],
    current_stock: f64,
    lead_time_periods: usize,
    cadence: Cadence,
) -> StockoutProjection {
    let mut cumulative = 0.0;
    let mut hit = None;
    for (index, period) in periods.iter().enumerate() {
        cumulative += period.point;
        if cumulative > current_stock {
            hit = Some((index + 1, period.period));
            break;
        }
    }

    match hit {
        Some((period, date)) => StockoutProjection {
            current_stock,
            period: StockoutPeriod::AtPeriod(period),
            date: Some(date),
            risk: grade_risk(period, lead_time_periods, cadence),
        },
        None => StockoutProjection {
            current_stock,
            period: StockoutPeriod::BeyondHorizon,
            date: None,
            risk: StockoutRisk::Low,
        },
    }
}

/// Grade urgency by periods-until-stockout relative to the lead time
fn grade_risk(periods_until: usize, lead_time_periods: usize, cadence: Cadence) -> StockoutRisk {
    let step_days = cadence.days() as usize;
    let medium_limit = ((MEDIUM_RISK_DAYS as usize + step_days - 1) / step_days).max(1);

    if periods_until <= lead_time_periods {
        StockoutRisk::Critical
    } else if periods_until <= 2 * lead_time_periods {
        StockoutRisk::High
    } else if periods_until <= medium_limit {
        StockoutRisk::Medium
    } else {
        StockoutRisk::Low
    }
}
