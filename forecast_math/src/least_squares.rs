//! Penalised least squares solver.
//!
//! The additive model is linear in its coefficients once the changepoint
//! locations and seasonal periods are fixed, so fitting reduces to
//!
//! ```text
//! minimize ||y - Xβ||² + Σ λ_j β_j²
//! ```
//!
//! The ridge term is folded in by appending `sqrt(λ_j)` rows to `X` (and zeros
//! to `y`) and solving the augmented ordinary least squares problem with SVD.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::{MathError, Result};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a ridge-penalised least squares problem.
///
/// `penalties[j]` is the ridge weight applied to coefficient `j`; a zero
/// weight leaves that coefficient unpenalised.
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Result<DVector<f64>> {
    let (rows, cols) = x.shape();

    if rows != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Design matrix has {} rows but target has {} values",
            rows,
            y.len()
        )));
    }
    if cols != penalties.len() {
        return Err(MathError::InvalidInput(format!(
            "Design matrix has {} columns but {} penalties were given",
            cols,
            penalties.len()
        )));
    }
    if let Some(bad) = penalties.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(MathError::InvalidInput(format!(
            "Ridge penalties must be finite and non-negative, got {}",
            bad
        )));
    }

    let augmented_x = DMatrix::from_fn(rows + cols, cols, |i, j| {
        if i < rows {
            x[(i, j)]
        } else if i - rows == j {
            penalties[j].sqrt()
        } else {
            0.0
        }
    });
    let augmented_y = DVector::from_fn(rows + cols, |i, _| if i < rows { y[i] } else { 0.0 });

    solve_least_squares(&augmented_x, &augmented_y).ok_or_else(|| {
        MathError::CalculationError("Least squares system is too ill-conditioned".to_string())
    })
}

/// Coefficients and in-sample fit of a ridge regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeFit {
    pub coefficients: Vec<f64>,
    pub fitted: Vec<f64>,
}

/// Ridge regression on a design given as feature columns of equal length
pub fn fit_ridge(columns: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Result<RidgeFit> {
    if columns.is_empty() {
        return Err(MathError::InvalidInput(
            "Design has no columns".to_string(),
        ));
    }
    if let Some(column) = columns.iter().find(|c| c.len() != y.len()) {
        return Err(MathError::InvalidInput(format!(
            "Feature column has {} rows but target has {}",
            column.len(),
            y.len()
        )));
    }

    let x = DMatrix::from_fn(y.len(), columns.len(), |i, j| columns[j][i]);
    let target = DVector::from_column_slice(y);
    let beta = solve_ridge(&x, &target, penalties)?;
    let fitted = &x * &beta;

    Ok(RidgeFit {
        coefficients: beta.iter().copied().collect(),
        fitted: fitted.iter().copied().collect(),
    })
}
