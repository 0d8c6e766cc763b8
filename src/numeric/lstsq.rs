//! Dense least squares shared by the polynomial and segmented fits.

use nalgebra::{DMatrix, DVector};

/// Singular values below this fraction of the largest are treated as zero.
const RANK_TOLERANCE: f64 = 1e-12;

/// Solution of an ordinary least-squares problem.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    /// Coefficients in design-column order.
    pub coefficients: Vec<f64>,
    /// Residual sum of squares.
    pub rss: f64,
}

/// Solve `min ||A·β − b||²` by SVD on a column-scaled design.
///
/// Returns `None` when the system is underdetermined or rank deficient.
pub fn least_squares(design: &DMatrix<f64>, target: &DVector<f64>) -> Option<LeastSquares> {
    let (rows, cols) = design.shape();
    if rows < cols || cols == 0 || target.len() != rows {
        return None;
    }

    // Vandermonde and hinge columns span many orders of magnitude
    let scales: Vec<f64> = (0..cols)
        .map(|j| {
            let norm = design.column(j).norm();
            if norm > 0.0 {
                norm
            } else {
                1.0
            }
        })
        .collect();

    let mut scaled = design.clone();
    for (j, scale) in scales.iter().enumerate() {
        for i in 0..rows {
            scaled[(i, j)] /= scale;
        }
    }

    let svd = scaled.clone().svd(true, true);
    let largest = svd.singular_values.max();
    if !largest.is_finite() || largest <= 0.0 {
        return None;
    }
    let eps = largest * RANK_TOLERANCE * rows.max(cols) as f64;
    if svd.rank(eps) < cols {
        return None;
    }

    let solution = svd.solve(target, eps).ok()?;
    let residual = target - &scaled * &solution;

    let coefficients: Vec<f64> = solution
        .iter()
        .zip(&scales)
        .map(|(c, scale)| c / scale)
        .collect();
    if coefficients.iter().any(|c| !c.is_finite()) {
        return None;
    }

    Some(LeastSquares {
        coefficients,
        rss: residual.norm_squared(),
    })
}
