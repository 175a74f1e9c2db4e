//! Rolling window statistics

use std::collections::VecDeque;

use crate::{stats, MathError, Result};

/// Fixed-capacity trailing window with incremental mean and sample
/// standard deviation.
///
/// Pushing beyond the capacity evicts the oldest value, so the window always
/// reflects the most recent `capacity` observations.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl RollingWindow {
    /// Create a new rolling window with the specified capacity
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MathError::InvalidInput(
                "window capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            sum: 0.0,
        })
    }

    /// Push a new value, evicting the oldest when the window is full
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.capacity {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
    }

    /// Number of values currently in the window
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the window holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check whether the window holds `capacity` values
    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Mean of the current window contents
    pub fn mean(&self) -> Result<f64> {
        if self.values.is_empty() {
            return Err(MathError::InsufficientData(
                "rolling window is empty".to_string(),
            ));
        }

        Ok(self.sum / self.values.len() as f64)
    }

    /// Sample standard deviation of the current window contents.
    ///
    /// Recomputed from the stored values rather than from running sums, so
    /// long-lived windows do not accumulate floating point drift.
    pub fn sample_std(&self) -> Result<f64> {
        let values: Vec<f64> = self.values.iter().copied().collect();
        stats::sample_std(&values)
    }

    /// Clear the window
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}
