//! Ordinary least squares solver.
//!
//! Solves
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD rather than normal equations, so a rank-deficient design (e.g. every
//!   observation on the same day) still yields the minimum-norm solution
//!   instead of a division by zero.
//! - Nalgebra's `QR::solve` is intended for square systems and panics for
//!   tall matrices, so it is not used here.

use nalgebra::{DMatrix, DVector};

/// Singular values at or below this are treated as zero.
const SVD_EPS: f64 = 1e-10;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the shapes disagree or the solution is not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.nrows() == 0 {
        return None;
    }
    let svd = x.clone().svd(true, true);
    let beta = svd.solve(y, SVD_EPS).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

/// Simple linear regression `y = a + b x`. Returns `(intercept, slope)`.
///
/// `x` is centred before solving to keep the design well conditioned when the
/// regressor is large (day counts spanning years).
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.is_empty() {
        return None;
    }
    let n = xs.len();
    let x_mean = xs.iter().sum::<f64>() / n as f64;

    let mut design = DMatrix::zeros(n, 2);
    for (i, &x) in xs.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = x - x_mean;
    }
    let target = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&design, &target)?;
    let slope = beta[1];
    let intercept = beta[0] - slope * x_mean;
    Some((intercept, slope))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_noisy_trend() {
        // Residuals +1, -1, -1, +1 around y = 1 + 2x are orthogonal to [1, x].
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [2.0, 2.0, 4.0, 8.0];
        let (a, b) = fit_line(&xs, &ys).unwrap();
        assert!((b - 2.0).abs() < 1e-10, "slope {b}");
        assert!((a - 1.0).abs() < 1e-10, "intercept {a}");
    }

    #[test]
    fn constant_regressor_gives_flat_line_at_mean() {
        let xs = [5.0, 5.0, 5.0];
        let ys = [1.0, 2.0, 6.0];
        let (a, b) = fit_line(&xs, &ys).unwrap();
        assert!(b.abs() < 1e-12);
        assert!((a - 3.0).abs() < 1e-10);
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        assert!(fit_line(&[1.0], &[1.0, 2.0]).is_none());
        assert!(fit_line(&[], &[]).is_none());
    }
}
