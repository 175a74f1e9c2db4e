//! Engine facade over a record store
//!
//! Wires the pipeline together per item: store read, preparation, selection,
//! result assembly. Every computation is a pure function of the loaded
//! series, so bulk operations fan items out to worker threads with no shared
//! state; a per-item timeout, when configured, abandons the whole computation
//! as a single unit.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use stock_series::{Cadence, RecordStore};

use crate::anomaly::{score_series, AnomalyReport};
use crate::error::{ForecastError, Result};
use crate::prepare::{prepare_series, PreparedSeries};
use crate::result::{assemble_result, ForecastResult};
use crate::selection::{select_and_forecast, SelectorConfig};

/// Minimum usable points after preparation before a forecast is attempted
pub const MIN_FORECAST_POINTS: usize = 4;

/// Engine-level configuration.
///
/// These are per-engine defaults; horizon, sensitivity and stock level are
/// always explicit call parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Expected spacing of the consumption series
    pub cadence: Cadence,
    /// Seasonal cycle length for the decomposition candidate
    pub season_length: usize,
    /// Trailing window for the moving-average baseline
    pub ma_window: usize,
    /// Replenishment lead time used for stockout risk grading
    pub lead_time_periods: usize,
    /// Optional wall-clock budget per item computation
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cadence: Cadence::weekly(),
            season_length: 7,
            ma_window: 4,
            lead_time_periods: 2,
            timeout: None,
        }
    }
}

impl EngineConfig {
    fn selector(&self) -> SelectorConfig {
        SelectorConfig {
            season_length: self.season_length,
            ma_window: self.ma_window,
        }
    }
}

/// Demand forecasting engine over a record store
#[derive(Debug, Clone)]
pub struct ForecastEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: RecordStore> ForecastEngine<S> {
    /// Create an engine with the default configuration
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    /// Create an engine with a custom configuration
    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Forecast one item `horizon` periods ahead.
    ///
    /// When `current_stock` is not supplied the store is consulted; an item
    /// without a stored stock level simply gets no stockout projection.
    pub fn forecast(
        &self,
        item_id: &str,
        horizon: usize,
        current_stock: Option<f64>,
    ) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "forecast horizon must be at least 1 period".to_string(),
            ));
        }

        let (prepared, stock) = self.load_item(item_id, current_stock)?;
        debug!(item_id, horizon, points = prepared.len(), "forecasting item");

        let input = ForecastInput {
            item_id: item_id.to_string(),
            prepared,
            stock,
            horizon,
            selector: self.config.selector(),
            lead_time_periods: self.config.lead_time_periods,
        };

        match self.config.timeout {
            None => input.compute(),
            Some(timeout) => run_with_timeout(input, timeout),
        }
    }

    /// Score one item's consumption history for anomalies
    pub fn detect_anomalies(&self, item_id: &str, sensitivity: u8) -> Result<AnomalyReport> {
        let series = self.store.get_series(item_id, None)?;
        let prepared = prepare_series(&series, self.config.cadence)?;

        let points = score_series(&prepared, sensitivity)?;
        Ok(AnomalyReport::from_points(item_id, sensitivity, points))
    }

    /// Load and prepare one item, resolving the stock level
    fn load_item(
        &self,
        item_id: &str,
        current_stock: Option<f64>,
    ) -> Result<(PreparedSeries, Option<f64>)> {
        let series = self.store.get_series(item_id, None)?;
        let prepared = prepare_series(&series, self.config.cadence)?;

        if prepared.len() < MIN_FORECAST_POINTS {
            return Err(ForecastError::InsufficientData {
                needed: MIN_FORECAST_POINTS,
                got: prepared.len(),
            });
        }

        let stock = current_stock.or_else(|| self.store.get_current_stock(item_id).ok());
        Ok((prepared, stock))
    }

    /// Forecast many items, isolating per-item failures.
    ///
    /// Each item is computed on its own worker thread over owned inputs; one
    /// bad series never aborts the batch. With a configured timeout, an item
    /// that exceeds the budget reports `ComputationTimeout` and its worker is
    /// abandoned.
    pub fn bulk_forecast(
        &self,
        item_ids: &[String],
        horizon: usize,
    ) -> BTreeMap<String, Result<ForecastResult>> {
        let mut results = BTreeMap::new();
        let mut pending = Vec::new();

        for item_id in item_ids {
            if horizon == 0 {
                results.insert(
                    item_id.clone(),
                    Err(ForecastError::InvalidParameter(
                        "forecast horizon must be at least 1 period".to_string(),
                    )),
                );
                continue;
            }

            match self.load_item(item_id, None) {
                Ok((prepared, stock)) => {
                    let input = ForecastInput {
                        item_id: item_id.clone(),
                        prepared,
                        stock,
                        horizon,
                        selector: self.config.selector(),
                        lead_time_periods: self.config.lead_time_periods,
                    };

                    let (tx, rx) = mpsc::channel();
                    thread::spawn(move || {
                        let _ = tx.send(input.compute());
                    });
                    pending.push((item_id.clone(), rx));
                }
                Err(e) => {
                    results.insert(item_id.clone(), Err(e));
                }
            }
        }

        for (item_id, rx) in pending {
            let outcome = collect_worker(rx, self.config.timeout);
            debug!(item_id = %item_id, ok = outcome.is_ok(), "bulk forecast item finished");
            results.insert(item_id, outcome);
        }

        results
    }

    /// Score many items for anomalies, isolating per-item failures
    pub fn bulk_detect_anomalies(
        &self,
        item_ids: &[String],
        sensitivity: u8,
    ) -> BTreeMap<String, Result<AnomalyReport>> {
        item_ids
            .iter()
            .map(|item_id| {
                (
                    item_id.clone(),
                    self.detect_anomalies(item_id, sensitivity),
                )
            })
            .collect()
    }
}

/// Owned inputs for one item's forecast computation
struct ForecastInput {
    item_id: String,
    prepared: PreparedSeries,
    stock: Option<f64>,
    horizon: usize,
    selector: SelectorConfig,
    lead_time_periods: usize,
}

impl ForecastInput {
    fn compute(self) -> Result<ForecastResult> {
        let outcome = select_and_forecast(&self.prepared, self.horizon, &self.selector)?;
        Ok(assemble_result(
            &self.item_id,
            &self.prepared,
            outcome,
            self.stock,
            self.lead_time_periods,
        ))
    }
}

/// Run a computation on its own thread with a wall-clock budget
fn run_with_timeout(input: ForecastInput, timeout: Duration) -> Result<ForecastResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(input.compute());
    });
    collect_worker(rx, Some(timeout))
}

/// Receive a worker result, honoring an optional timeout
fn collect_worker(
    rx: mpsc::Receiver<Result<ForecastResult>>,
    timeout: Option<Duration>,
) -> Result<ForecastResult> {
    match timeout {
        Some(budget) => match rx.recv_timeout(budget) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(ForecastError::ComputationTimeout(budget)),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ForecastError::Computation(
                "forecast worker terminated unexpectedly".to_string(),
            )),
        },
        None => rx.recv().unwrap_or_else(|_| {
            Err(ForecastError::Computation(
                "forecast worker terminated unexpectedly".to_string(),
            ))
        }),
    }
}
