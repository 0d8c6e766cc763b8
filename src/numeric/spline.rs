//! Exact cubic-spline interpolation stored as a piecewise polynomial.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::polynomial::{self, Roots};
use crate::error::{AnalysisError, AnalysisResult};

/// Piecewise polynomial in local form.
///
/// On segment `i` the value is `Σ coefficients[i][k] · (x − breaks[i])^k`.
/// Points left of the first break or right of the last are extrapolated
/// with the outer pieces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewisePolynomial {
    breaks: Vec<f64>,
    coefficients: Vec<Vec<f64>>,
}

impl PiecewisePolynomial {
    /// Interpolating cubic spline with not-a-knot end conditions.
    ///
    /// Three points give a single parabola and two points a straight line,
    /// which is what the not-a-knot conditions degenerate to.
    pub fn interpolate(x: &[f64], y: &[f64]) -> AnalysisResult<Self> {
        if x.len() != y.len() {
            return Err(AnalysisError::Validation(format!(
                "x and y must have the same length ({} != {})",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(AnalysisError::Fit(format!(
                "cubic spline needs at least 2 points, got {}",
                x.len()
            )));
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(AnalysisError::Fit("non-finite value in spline input".to_string()));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AnalysisError::Fit(
                "cubic spline requires strictly increasing x".to_string(),
            ));
        }

        let coefficients = match x.len() {
            2 => {
                let slope = (y[1] - y[0]) / (x[1] - x[0]);
                vec![vec![y[0], slope, 0.0, 0.0]]
            }
            3 => {
                let parabola = polynomial::polyfit(x, y, 2)?;
                x[..2].iter().map(|&xi| taylor_coefficients(&parabola, xi)).collect()
            }
            _ => not_a_knot(x, y)?,
        };

        Ok(Self {
            breaks: x.to_vec(),
            coefficients,
        })
    }

    /// Segment boundaries.
    pub fn breaks(&self) -> &[f64] {
        &self.breaks
    }

    /// Local coefficients per segment.
    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.coefficients
    }

    /// Number of polynomial pieces.
    pub fn segments(&self) -> usize {
        self.coefficients.len()
    }

    /// Evaluate at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let i = self.segment_of(x);
        polynomial::evaluate(&self.coefficients[i], x - self.breaks[i])
    }

    /// Piecewise derivative over the same breaks.
    pub fn derivative(&self) -> Self {
        Self {
            breaks: self.breaks.clone(),
            coefficients: self
                .coefficients
                .iter()
                .map(|c| polynomial::derivative(c))
                .collect(),
        }
    }

    /// Every real `x` with `p(x) = target`, enumerated segment by segment.
    ///
    /// Roots on a shared break are reported once. The outer pieces
    /// contribute their extrapolated roots too.
    pub fn solve(&self, target: f64) -> Roots {
        let last = self.segments() - 1;
        let mut roots = Vec::new();

        for (i, local) in self.coefficients.iter().enumerate() {
            let start = self.breaks[i];
            let width = self.breaks[i + 1] - start;
            let tolerance = 1e-9 * width;

            let mut shifted = local.clone();
            shifted[0] -= target;

            match polynomial::real_roots(&polynomial::trim_negligible(&shifted, width)) {
                Roots::Infinite => return Roots::Infinite,
                Roots::Finite(local_roots) => {
                    roots.extend(
                        local_roots
                            .into_iter()
                            .filter(|t| {
                                (i == 0 || *t >= -tolerance) && (i == last || *t <= width + tolerance)
                            })
                            .map(|t| start + t),
                    );
                }
            }
        }

        roots.sort_by(|a, b| a.total_cmp(b));
        roots.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * a.abs().max(1.0));
        Roots::Finite(roots)
    }

    fn segment_of(&self, x: f64) -> usize {
        let upper = self.breaks.partition_point(|b| *b <= x);
        upper.saturating_sub(1).min(self.segments() - 1)
    }
}

/// Local coefficients of a global polynomial expanded around `at`.
fn taylor_coefficients(global: &[f64], at: f64) -> Vec<f64> {
    let mut local = Vec::with_capacity(4);
    let mut current = global.to_vec();
    let mut factorial = 1.0;
    for k in 0..4 {
        if k > 0 {
            factorial *= k as f64;
        }
        local.push(polynomial::evaluate(&current, at) / factorial);
        current = polynomial::derivative(&current);
    }
    local
}

/// Solve for knot second derivatives with continuous third derivative
/// at the second and penultimate knots.
fn not_a_knot(x: &[f64], y: &[f64]) -> AnalysisResult<Vec<Vec<f64>>> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let secant: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    let mut system = DMatrix::<f64>::zeros(n, n);
    let mut rhs = DVector::<f64>::zeros(n);

    system[(0, 0)] = h[1];
    system[(0, 1)] = -(h[0] + h[1]);
    system[(0, 2)] = h[0];

    for i in 1..n - 1 {
        system[(i, i - 1)] = h[i - 1];
        system[(i, i)] = 2.0 * (h[i - 1] + h[i]);
        system[(i, i + 1)] = h[i];
        rhs[i] = 6.0 * (secant[i] - secant[i - 1]);
    }

    system[(n - 1, n - 3)] = h[n - 2];
    system[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
    system[(n - 1, n - 1)] = h[n - 3];

    let second = system
        .lu()
        .solve(&rhs)
        .ok_or_else(|| AnalysisError::Fit("singular spline system".to_string()))?;

    Ok((0..n - 1)
        .map(|i| {
            vec![
                y[i],
                secant[i] - h[i] * (2.0 * second[i] + second[i + 1]) / 6.0,
                second[i] / 2.0,
                (second[i + 1] - second[i]) / (6.0 * h[i]),
            ]
        })
        .collect())
}
