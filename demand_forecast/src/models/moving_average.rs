//! Moving-average baseline model
//!
//! Forecast is the trailing-window mean held flat across the horizon, with
//! bounds one z-multiple of the trailing sample deviation either side. The
//! baseline is feasible for any series of at least 2 points and acts as the
//! fallback when the richer candidates are skipped.

use demand_math::RollingWindow;

use crate::error::{ForecastError, Result};
use crate::models::{
    interval_z, FittedModel, ForecastInterval, ForecastModel, ModelForecast, ModelKind,
    CONFIDENCE_LEVEL,
};
use crate::prepare::PreparedSeries;

/// Default trailing window length
pub const DEFAULT_WINDOW: usize = 4;

/// Moving-average baseline model
#[derive(Debug, Clone)]
pub struct MovingAverageModel {
    window: usize,
}

/// Trained moving-average baseline
#[derive(Debug, Clone)]
pub struct FittedMovingAverage {
    name: String,
    /// Window actually used (capped at the series length)
    window: usize,
    /// Trailing mean the forecast holds flat
    trailing_mean: f64,
    /// Trailing sample deviation; zero for a constant window
    trailing_std: f64,
    z: f64,
}

impl MovingAverageModel {
    /// Create a new moving-average model with the given trailing window
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "window size must be positive".to_string(),
            ));
        }

        Ok(Self { window })
    }

    /// The configured window length
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for MovingAverageModel {
    fn default() -> Self {
        Self { window: DEFAULT_WINDOW }
    }
}

impl ForecastModel for MovingAverageModel {
    type Fitted = FittedMovingAverage;

    fn fit(&self, series: &PreparedSeries) -> Result<FittedMovingAverage> {
        let values = series.values();
        let n = values.len();
        if n < 2 {
            return Err(ForecastError::InsufficientData { needed: 2, got: n });
        }

        let window = self.window.min(n);
        let mut trailing = RollingWindow::new(window)?;
        for &value in &values[n - window..] {
            trailing.push(value);
        }

        let trailing_mean = trailing.mean()?;
        // window >= 2 here, but a constant window still yields zero spread;
        // bounds collapse to the point rather than dividing by zero.
        let trailing_std = if window >= 2 { trailing.sample_std()? } else { 0.0 };

        Ok(FittedMovingAverage {
            name: format!("Moving Average (window={})", window),
            window,
            trailing_mean,
            trailing_std,
            z: interval_z(CONFIDENCE_LEVEL)?,
        })
    }

    fn kind(&self) -> ModelKind {
        ModelKind::MovingAverage
    }
}

impl FittedModel for FittedMovingAverage {
    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        let half_width = self.z * self.trailing_std;

        let steps = (0..horizon)
            .map(|_| ForecastInterval {
                point: self.trailing_mean,
                lower: self.trailing_mean - half_width,
                upper: self.trailing_mean + half_width,
            })
            .collect();

        ModelForecast::new(steps)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::MovingAverage
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

impl FittedMovingAverage {
    /// Window actually used after capping at the series length
    pub fn window(&self) -> usize {
        self.window
    }
}
