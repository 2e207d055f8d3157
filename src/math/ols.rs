//! Least squares solvers.
//!
//! Both forecasters reduce their estimation steps to small linear regressions:
//!
//! ```text
//! minimize ||y - X β||² + Σ λ_j β_j²
//! ```
//!
//! - the additive model solves one ridge-penalized problem per fit
//! - the SARIMA estimator solves two plain problems per order candidate
//!
//! Implementation choices:
//! - Ridge penalties are applied by appending `sqrt(λ_j) e_j` rows to `X`
//!   (and zeros to `y`), so a single SVD solve handles both cases.
//! - SVD rather than QR: the design matrices are tall, and nalgebra's
//!   `QR::solve` is intended for square systems.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() == 0 || x.ncols() == 0 || x.nrows() != y.len() {
        return None;
    }

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

/// Solve a ridge-penalized least squares problem.
///
/// `penalties[j]` is the L2 weight on coefficient `j` (`0.0` = unpenalized).
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Option<DVector<f64>> {
    if penalties.len() != x.ncols() {
        return None;
    }

    let penalized: Vec<(usize, f64)> = penalties
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, lambda)| lambda > 0.0 && lambda.is_finite())
        .collect();
    if penalized.is_empty() {
        return solve_least_squares(x, y);
    }

    let n = x.nrows();
    let k = x.ncols();
    let mut xa = DMatrix::<f64>::zeros(n + penalized.len(), k);
    xa.view_mut((0, 0), (n, k)).copy_from(x);
    for (row, &(col, lambda)) in penalized.iter().enumerate() {
        xa[(n + row, col)] = lambda.sqrt();
    }

    let mut ya = DVector::<f64>::zeros(n + penalized.len());
    ya.rows_mut(0, n).copy_from(y);

    solve_least_squares(&xa, &ya)
}
