//! Descriptive statistics over value slices

use crate::{MathError, Result};

/// Arithmetic mean of a slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "cannot compute the mean of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n - 1 denominator) of a slice
pub fn sample_variance(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "sample variance needs at least 2 values, have {}",
            values.len()
        )));
    }

    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();

    Ok(sum_sq / (values.len() - 1) as f64)
}

/// Sample standard deviation (n - 1 denominator) of a slice
pub fn sample_std(values: &[f64]) -> Result<f64> {
    Ok(sample_variance(values)?.sqrt())
}

/// First differences of a slice.
///
/// Returns an empty vector for slices shorter than 2.
pub fn difference(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return Vec::new();
    }

    values.windows(2).map(|w| w[1] - w[0]).collect()
}
