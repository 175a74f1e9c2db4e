//! Autoregressive integrated model
//!
//! ARIMA(p,1,q) over a fixed small order grid. Orders are chosen by AIC
//! computed from the conditional sum of squared innovations; estimation is
//! pure least squares (lagged-value OLS for AR terms, Hannan-Rissanen
//! second-stage OLS when MA terms are present), so fitting is deterministic
//! and bounded.

use demand_math::{difference, ols};

use crate::error::{ForecastError, Result};
use crate::models::{
    interval_z, FittedModel, ForecastInterval, ForecastModel, ModelForecast, ModelKind,
    CONFIDENCE_LEVEL,
};
use crate::prepare::PreparedSeries;

/// Minimum prepared points before the model is feasible
pub const MIN_OBSERVATIONS: usize = 8;

/// Largest autoregressive order in the grid
const MAX_AR_ORDER: usize = 2;
/// Largest moving-average order in the grid
const MAX_MA_ORDER: usize = 2;
/// Long autoregression order for the Hannan-Rissanen first stage
const LONG_AR_ORDER: usize = 4;

/// ARIMA model with first-order differencing and a fixed (p, q) search grid
#[derive(Debug, Clone)]
pub struct ArimaModel {
    max_p: usize,
    max_q: usize,
}

impl ArimaModel {
    /// Create a new ARIMA model searching p in 0..=2 and q in 0..=2
    pub fn new() -> Self {
        Self {
            max_p: MAX_AR_ORDER,
            max_q: MAX_MA_ORDER,
        }
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::new()
    }
}

/// One estimated (p, q) grid cell
#[derive(Debug, Clone)]
struct OrderFit {
    p: usize,
    q: usize,
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sigma: f64,
    aic: f64,
    /// Innovations over the differenced series, zero before `start`
    residuals: Vec<f64>,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct FittedArima {
    name: String,
    fit: OrderFit,
    /// Differenced history the recursion continues from
    diffs: Vec<f64>,
    /// Last observed level, the integration base
    last_value: f64,
    z: f64,
}

impl ForecastModel for ArimaModel {
    type Fitted = FittedArima;

    fn fit(&self, series: &PreparedSeries) -> Result<FittedArima> {
        let values = series.values();
        let n = values.len();
        if n < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                got: n,
            });
        }

        let diffs = difference(values);

        let mut best: Option<OrderFit> = None;
        for p in 0..=self.max_p {
            for q in 0..=self.max_q {
                let Some(candidate) = fit_order(&diffs, p, q) else {
                    continue;
                };
                let improved = match &best {
                    None => true,
                    Some(current) => candidate.aic < current.aic,
                };
                if improved {
                    best = Some(candidate);
                }
            }
        }

        // The (0,0) cell is a plain mean regression and always estimable here
        let fit = best.ok_or_else(|| {
            ForecastError::Computation("no ARIMA order could be estimated".to_string())
        })?;

        Ok(FittedArima {
            name: format!("ARIMA({},1,{})", fit.p, fit.q),
            fit,
            diffs,
            last_value: values[n - 1],
            z: interval_z(CONFIDENCE_LEVEL)?,
        })
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Arima
    }
}

impl FittedModel for FittedArima {
    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        let p = self.fit.p;
        let q = self.fit.q;

        let mut diff_history = self.diffs.clone();
        let mut shock_history = self.fit.residuals.clone();
        let mut level = self.last_value;
        let mut steps = Vec::with_capacity(horizon);

        for step in 1..=horizon {
            let mut predicted = self.fit.intercept;
            for i in 0..p {
                predicted += self.fit.ar[i] * diff_history[diff_history.len() - 1 - i];
            }
            for j in 0..q {
                predicted += self.fit.ma[j] * shock_history[shock_history.len() - 1 - j];
            }

            // Future shocks are zero in expectation
            diff_history.push(predicted);
            shock_history.push(0.0);

            level += predicted;
            let half_width = self.z * self.fit.sigma * (step as f64).sqrt();

            steps.push(ForecastInterval {
                point: level,
                lower: level - half_width,
                upper: level + half_width,
            });
        }

        ModelForecast::new(steps)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Arima
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Estimate one (p, q) order on the differenced series.
///
/// Returns None when the cell does not have enough observations for its own
/// regressions; an unusable cell is simply left out of the AIC comparison.
fn fit_order(diffs: &[f64], p: usize, q: usize) -> Option<OrderFit> {
    let n = diffs.len();

    let (intercept, ar, ma) = if q == 0 {
        let rows = n.checked_sub(p)?;
        if rows < p + 2 {
            return None;
        }

        let y = diffs[p..].to_vec();
        let columns = lag_columns(diffs, p, p, n);
        let beta = ols(&columns, &y).ok()?;

        (beta[0], beta[1..].to_vec(), Vec::new())
    } else {
        // Hannan-Rissanen: approximate the innovations with a long AR fit,
        // then regress on both value lags and innovation lags.
        let m = LONG_AR_ORDER.min(n / 3).max(1);
        let rows_long = n.checked_sub(m)?;
        if rows_long < m + 2 {
            return None;
        }

        let y_long = diffs[m..].to_vec();
        let columns_long = lag_columns(diffs, m, m, n);
        let beta_long = ols(&columns_long, &y_long).ok()?;

        // Innovations from the long AR, aligned with the differenced series
        let mut innovations = vec![0.0; n];
        for t in m..n {
            let mut predicted = beta_long[0];
            for i in 0..m {
                predicted += beta_long[i + 1] * diffs[t - 1 - i];
            }
            innovations[t] = diffs[t] - predicted;
        }

        let start = (m + q).max(p);
        let rows = n.checked_sub(start)?;
        if rows < p + q + 2 {
            return None;
        }

        let y = diffs[start..].to_vec();
        let mut columns = lag_columns(diffs, p, start, n);
        columns.extend(lag_columns(&innovations, q, start, n));
        let beta = ols(&columns, &y).ok()?;

        (
            beta[0],
            beta[1..=p].to_vec(),
            beta[p + 1..].to_vec(),
        )
    };

    // Conditional sum of squares pass with zero-initialized shocks
    let start = p.max(q);
    if start >= n {
        return None;
    }

    let mut residuals = vec![0.0; n];
    let mut sse = 0.0;
    for t in start..n {
        let mut predicted = intercept;
        for i in 0..p {
            predicted += ar[i] * diffs[t - 1 - i];
        }
        for j in 0..q {
            predicted += ma[j] * residuals[t - 1 - j];
        }
        residuals[t] = diffs[t] - predicted;
        sse += residuals[t] * residuals[t];
    }

    let count = (n - start) as f64;
    let mse = (sse / count).max(1e-12);
    let parameters = (p + q + 1) as f64;
    let aic = count * mse.ln() + 2.0 * parameters;

    Some(OrderFit {
        p,
        q,
        intercept,
        ar,
        ma,
        sigma: mse.sqrt(),
        aic,
        residuals,
    })
}

/// Lagged copies of `source`: one column per lag 1..=lags, rows starting at
/// `start` and running to `end`.
fn lag_columns(source: &[f64], lags: usize, start: usize, end: usize) -> Vec<Vec<f64>> {
    (1..=lags)
        .map(|lag| source[start - lag..end - lag].to_vec())
        .collect()
}
