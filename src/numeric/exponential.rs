//! Nonlinear least squares for `y = a·e^(b·x) + c`.

use nalgebra::{Matrix3, Vector3};

use crate::error::{AnalysisError, AnalysisResult};

/// Exponential model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Levenberg–Marquardt solver settings.
#[derive(Debug, Clone, Copy)]
pub struct LevenbergMarquardt {
    /// Maximum number of accepted or rejected steps.
    pub max_iterations: usize,
    /// Relative step size that counts as converged.
    pub step_tolerance: f64,
    /// Relative cost reduction that counts as converged.
    pub cost_tolerance: f64,
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            step_tolerance: 1e-12,
            cost_tolerance: 1e-14,
        }
    }
}

impl LevenbergMarquardt {
    /// Fit the exponential model.
    ///
    /// The abscissa is normalised to `[0, 1]` internally and the start point
    /// comes from a log-linear regression above a baseline just under
    /// `min(y)`. Failure to converge is reported, never retried.
    pub fn fit(&self, x: &[f64], y: &[f64]) -> AnalysisResult<ExponentialParams> {
        if x.len() != y.len() {
            return Err(AnalysisError::Validation(format!(
                "x and y must have the same length ({} != {})",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 3 {
            return Err(AnalysisError::Fit(format!(
                "exponential fit needs at least 3 points, got {}",
                x.len()
            )));
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(AnalysisError::Fit("non-finite value in exponential fit input".to_string()));
        }

        let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let y_min = y.iter().copied().fold(f64::INFINITY, f64::min);
        let y_max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = x_max - x_min;
        let height = y_max - y_min;
        if width <= 0.0 || height <= 0.0 {
            return Err(AnalysisError::Fit(
                "exponential fit is degenerate for constant x or y".to_string(),
            ));
        }

        let u: Vec<f64> = x.iter().map(|v| (v - x_min) / width).collect();
        let start = seed(&u, y, y_min - 0.1 * height)?;
        let scaled = self.minimize(&u, y, start)?;

        // Undo the normalisation: a·e^(b·x) = A·e^(B·(x − x_min)/width)
        let b = scaled[1] / width;
        let a = scaled[0] * (-b * x_min).exp();
        let params = ExponentialParams { a, b, c: scaled[2] };

        if !(params.a.is_finite() && params.b.is_finite() && params.c.is_finite()) {
            return Err(AnalysisError::Fit(
                "exponential parameters are not finite in the original units".to_string(),
            ));
        }
        Ok(params)
    }

    fn minimize(&self, u: &[f64], y: &[f64], start: Vector3<f64>) -> AnalysisResult<Vector3<f64>> {
        let mut params = start;
        let mut cost = sum_of_squares(u, y, &params);
        let mut damping = 1e-3;

        for iteration in 0..self.max_iterations {
            let (jtj, jtr) = normal_equations(u, y, &params);

            let mut augmented = jtj;
            for k in 0..3 {
                augmented[(k, k)] += damping * jtj[(k, k)].max(1e-12);
            }

            let step = match augmented.lu().solve(&(-jtr)) {
                Some(step) if step.iter().all(|s| s.is_finite()) => step,
                _ => {
                    damping *= 10.0;
                    if damping > 1e16 {
                        break;
                    }
                    continue;
                }
            };

            let candidate = params + step;
            let candidate_cost = sum_of_squares(u, y, &candidate);

            if candidate_cost.is_finite() && candidate_cost < cost {
                let reduction = cost - candidate_cost;
                params = candidate;
                cost = candidate_cost;
                damping = (damping / 10.0).max(1e-12);

                let small_step = step.norm() <= self.step_tolerance * (params.norm() + self.step_tolerance);
                let small_gain = reduction <= self.cost_tolerance * cost.max(f64::MIN_POSITIVE);
                if small_step || small_gain || cost == 0.0 {
                    tracing::trace!(iteration, cost, "exponential fit converged");
                    return Ok(params);
                }
            } else {
                damping *= 10.0;
                if damping > 1e16 {
                    // No descent direction left: a numerical minimum
                    tracing::trace!(iteration, cost, "exponential fit stalled at minimum");
                    return Ok(params);
                }
            }
        }

        Err(AnalysisError::Fit(format!(
            "exponential fit did not converge within {} iterations",
            self.max_iterations
        )))
    }
}

fn model(u: f64, p: &Vector3<f64>) -> f64 {
    p[0] * (p[1] * u).exp() + p[2]
}

fn sum_of_squares(u: &[f64], y: &[f64], p: &Vector3<f64>) -> f64 {
    0.5 * u
        .iter()
        .zip(y)
        .map(|(ui, yi)| (model(*ui, p) - yi).powi(2))
        .sum::<f64>()
}

fn normal_equations(u: &[f64], y: &[f64], p: &Vector3<f64>) -> (Matrix3<f64>, Vector3<f64>) {
    let mut jtj = Matrix3::zeros();
    let mut jtr = Vector3::zeros();
    for (ui, yi) in u.iter().zip(y) {
        let growth = (p[1] * ui).exp();
        let row = Vector3::new(growth, p[0] * ui * growth, 1.0);
        let residual = p[0] * growth + p[2] - yi;
        jtj += row * row.transpose();
        jtr += row * residual;
    }
    (jtj, jtr)
}

/// Start point from `ln(y − baseline) = ln(A) + B·u`.
fn seed(u: &[f64], y: &[f64], baseline: f64) -> AnalysisResult<Vector3<f64>> {
    let points: Vec<(f64, f64)> = u
        .iter()
        .zip(y)
        .map(|(ui, yi)| (*ui, (yi - baseline).ln()))
        .collect();
    let (slope, intercept) = linear_regression(&points)?;
    Ok(Vector3::new(intercept.exp(), slope, baseline))
}

/// Linear regression on (x, y) pairs.
/// Returns (slope, intercept).
fn linear_regression(points: &[(f64, f64)]) -> AnalysisResult<(f64, f64)> {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return Err(AnalysisError::Fit("singular seed regression".to_string()));
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    Ok((slope, intercept))
}
