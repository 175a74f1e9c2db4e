//! Least-squares fitting
//!
//! Contains the two regression forms the forecasting models need:
//! a straight line over an implicit 0-based index, and general OLS via
//! normal equations for lagged-value regressions.

use serde::{Deserialize, Serialize};

use crate::{stats, MathError, Result};

/// A fitted straight line over a 0-based index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Change in value per index step
    pub slope: f64,
    /// Value at index 0
    pub intercept: f64,
    /// Sample standard deviation of the fit residuals
    pub residual_std: f64,
    /// Number of observations the line was fitted on
    pub n: usize,
}

impl LinearFit {
    /// Predicted value at index `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a straight line to `values` against their 0-based index
pub fn fit_line(values: &[f64]) -> Result<LinearFit> {
    let n = values.len();
    if n < 2 {
        return Err(MathError::InsufficientData(
            "linear fit needs at least 2 points".to_string(),
        ));
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = stats::mean(values)?;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    if denominator.abs() < 1e-10 {
        return Err(MathError::CalculationError(
            "cannot fit a line: index spread is degenerate".to_string(),
        ));
    }

    let slope = numerator / denominator;
    let intercept = y_mean - slope * x_mean;

    let residual_sq: f64 = values
        .iter()
        .enumerate()
        .map(|(i, &y)| (y - (intercept + slope * i as f64)).powi(2))
        .sum();
    let dof = n.saturating_sub(2).max(1);
    let residual_std = (residual_sq / dof as f64).sqrt();

    Ok(LinearFit {
        slope,
        intercept,
        residual_std,
        n,
    })
}

/// Fit OLS with an intercept: y = beta[0] + beta[1] * x1 + ...
///
/// `columns` holds one regressor per entry, each the same length as `y`.
/// Returns the coefficient vector with the intercept first. Solved through
/// the normal equations with a small ridge term on the diagonal, so nearly
/// collinear lag columns still produce a usable fit.
pub fn ols(columns: &[Vec<f64>], y: &[f64]) -> Result<Vec<f64>> {
    let n = y.len();
    if n == 0 {
        return Err(MathError::InsufficientData(
            "OLS needs at least one observation".to_string(),
        ));
    }
    for column in columns {
        if column.len() != n {
            return Err(MathError::InvalidInput(format!(
                "regressor length {} does not match target length {}",
                column.len(),
                n
            )));
        }
    }

    let k = columns.len();
    let params = k + 1;

    // Build X'X and X'y with the intercept as the first column
    let mut xtx = vec![vec![0.0; params]; params];
    let mut xty = vec![0.0; params];

    for obs in 0..n {
        xtx[0][0] += 1.0;
        for i in 0..k {
            let xi = columns[i][obs];
            xtx[0][i + 1] += xi;
            xtx[i + 1][0] += xi;
            for j in 0..k {
                xtx[i + 1][j + 1] += xi * columns[j][obs];
            }
        }

        xty[0] += y[obs];
        for i in 0..k {
            xty[i + 1] += columns[i][obs] * y[obs];
        }
    }

    // Ridge term keeps the system positive definite
    for i in 0..params {
        xtx[i][i] += 1e-8;
    }

    solve_symmetric(&xtx, &xty).ok_or_else(|| {
        MathError::CalculationError("normal equations are not positive definite".to_string())
    })
}

/// Solve A x = b for symmetric positive definite A via Cholesky decomposition
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_line_recovers_exact_line() {
        // y = 3 + 2x
        let values: Vec<f64> = (0..10).map(|i| 3.0 + 2.0 * i as f64).collect();
        let fit = fit_line(&values).unwrap();

        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 3.0).abs() < 1e-9);
        assert!(fit.residual_std < 1e-9);
        assert!((fit.predict(12.0) - 27.0).abs() < 1e-9);
    }

    #[test]
    fn fit_line_needs_two_points() {
        assert!(fit_line(&[1.0]).is_err());
    }

    #[test]
    fn fit_line_reports_residual_spread() {
        let values = vec![0.0, 2.5, 1.5, 4.0, 3.0];
        let fit = fit_line(&values).unwrap();

        assert!(fit.residual_std > 0.0);
        assert_eq!(fit.n, 5);
    }

    #[test]
    fn ols_recovers_coefficients() {
        // y = 1 + 2*x1 + 3*x2
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let x2 = vec![0.5, 2.5, 1.0, 3.0, 1.5, 3.5, 2.0, 4.0];
        let y: Vec<f64> = x1
            .iter()
            .zip(x2.iter())
            .map(|(a, b)| 1.0 + 2.0 * a + 3.0 * b)
            .collect();

        let beta = ols(&[x1, x2], &y).unwrap();

        assert!((beta[0] - 1.0).abs() < 1e-4);
        assert!((beta[1] - 2.0).abs() < 1e-4);
        assert!((beta[2] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn ols_without_regressors_returns_mean() {
        let y = vec![2.0, 4.0, 6.0, 8.0];
        let beta = ols(&[], &y).unwrap();

        assert_eq!(beta.len(), 1);
        assert!((beta[0] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn ols_validates_lengths() {
        let y = vec![1.0, 2.0, 3.0];
        assert!(ols(&[vec![1.0, 2.0]], &y).is_err());
        assert!(ols(&[], &[]).is_err());
    }

    #[test]
    fn ols_survives_constant_regressor() {
        // A constant column is collinear with the intercept; the ridge term
        // must keep the solve from failing.
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let constant = vec![1.0; 4];

        assert!(ols(&[constant], &y).is_ok());
    }
}
