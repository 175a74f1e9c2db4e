//! Seasonal/trend decomposition model
//!
//! Classical additive decomposition: a centered moving average estimates the
//! trend, per-position means of the detrended values estimate the seasonal
//! component, and the leftover residuals size the confidence bounds. The
//! trend is extrapolated with a straight line fitted to the smoothed trend.

use demand_math::{fit_line, mean, sample_std, LinearFit};

use crate::error::{ForecastError, Result};
use crate::models::{
    interval_z, FittedModel, ForecastInterval, ForecastModel, ModelForecast, ModelKind,
    CONFIDENCE_LEVEL,
};
use crate::prepare::PreparedSeries;

/// Seasonal/trend decomposition model
#[derive(Debug, Clone)]
pub struct SeasonalTrendModel {
    /// Length of one seasonal cycle in grid steps
    period: usize,
}

/// Fitted seasonal/trend model
#[derive(Debug, Clone)]
pub struct FittedSeasonalTrend {
    name: String,
    period: usize,
    /// Straight line through the smoothed trend, indexed from `trend_offset`
    trend_line: LinearFit,
    /// Grid index of the first trend observation the line was fitted on
    trend_offset: usize,
    /// Seasonal component per cycle position, normalized to zero mean
    seasonal: Vec<f64>,
    /// Sample standard deviation of the decomposition residuals
    residual_std: f64,
    /// Length of the fitted series
    n: usize,
    z: f64,
}

impl SeasonalTrendModel {
    /// Create a new seasonal/trend model with the given cycle length
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 2".to_string(),
            ));
        }

        Ok(Self { period })
    }

    /// The configured cycle length
    pub fn period(&self) -> usize {
        self.period
    }
}

impl ForecastModel for SeasonalTrendModel {
    type Fitted = FittedSeasonalTrend;

    fn fit(&self, series: &PreparedSeries) -> Result<FittedSeasonalTrend> {
        let values = series.values();
        let n = values.len();
        let needed = 2 * self.period;
        if n < needed {
            return Err(ForecastError::InsufficientData { needed, got: n });
        }

        // Centered moving average over one cycle; edges are dropped rather
        // than padded so the trend line is fitted on clean estimates only.
        let half = self.period / 2;
        let mut trend = Vec::with_capacity(n - 2 * half);
        for i in half..(n - half) {
            trend.push(mean(&values[i - half..=i + half])?);
        }

        let trend_line = fit_line(&trend)?;
        let trend_offset = half;

        // Seasonal component: mean detrended value per cycle position.
        // The centered region always spans at least one full cycle, so every
        // position receives at least one observation.
        let mut sums = vec![0.0; self.period];
        let mut counts = vec![0usize; self.period];
        for (j, &smoothed) in trend.iter().enumerate() {
            let index = trend_offset + j;
            let pos = index % self.period;
            sums[pos] += values[index] - smoothed;
            counts[pos] += 1;
        }

        let mut seasonal: Vec<f64> = sums
            .iter()
            .zip(counts.iter())
            .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
            .collect();

        // Normalize so the seasonal component carries no level
        let seasonal_mean = mean(&seasonal)?;
        for s in &mut seasonal {
            *s -= seasonal_mean;
        }

        let residuals: Vec<f64> = trend
            .iter()
            .enumerate()
            .map(|(j, &smoothed)| {
                let index = trend_offset + j;
                values[index] - smoothed - seasonal[index % self.period]
            })
            .collect();
        let residual_std = sample_std(&residuals)?;

        Ok(FittedSeasonalTrend {
            name: format!("Seasonal Trend (period={})", self.period),
            period: self.period,
            trend_line,
            trend_offset,
            seasonal,
            residual_std,
            n,
            z: interval_z(CONFIDENCE_LEVEL)?,
        })
    }

    fn kind(&self) -> ModelKind {
        ModelKind::SeasonalTrend
    }
}

impl FittedModel for FittedSeasonalTrend {
    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        let mut steps = Vec::with_capacity(horizon);

        for step in 1..=horizon {
            let index = self.n - 1 + step;
            let trend = self
                .trend_line
                .predict((index - self.trend_offset) as f64);
            let point = trend + self.seasonal[index % self.period];

            // Residual spread scaled with distance: bounds widen further out
            let half_width = self.z * self.residual_std * (step as f64).sqrt();

            steps.push(ForecastInterval {
                point,
                lower: point - half_width,
                upper: point + half_width,
            });
        }

        ModelForecast::new(steps)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::SeasonalTrend
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
