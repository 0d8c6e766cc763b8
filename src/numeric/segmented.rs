//! Segmented (piecewise-linear) regression with breakpoint estimation.
//!
//! The model with `k` breakpoints is
//!
//! ```text
//! y = const + alpha1·x + Σ beta_j·max(x − breakpoint_j, 0)
//! ```
//!
//! Breakpoints are refined with the hinge/step linearisation
//! `ψ ← ψ + γ/β` until they stop moving. Start points come from a profile
//! grid search over ordered breakpoint tuples, so results are deterministic.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use super::lstsq::least_squares;
use crate::error::{AnalysisError, AnalysisResult};

/// Segmented regression settings.
#[derive(Debug, Clone, Copy)]
pub struct SegmentedRegression {
    /// Maximum breakpoint updates per start.
    pub max_iterations: usize,
    /// Breakpoint movement (fraction of the x range) that counts as converged.
    pub tolerance: f64,
    /// Minimum distance from a breakpoint to either end of the data, as a fraction of the range.
    pub min_distance_to_edge: f64,
    /// Minimum distance between breakpoints, as a fraction of the range.
    pub min_distance_between_breakpoints: f64,
    /// Grid resolution per breakpoint for the start search.
    pub grid_points: usize,
    /// Number of best grid tuples refined iteratively.
    pub starts: usize,
}

impl Default for SegmentedRegression {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            tolerance: 1e-5,
            min_distance_to_edge: 0.02,
            min_distance_between_breakpoints: 0.01,
            grid_points: 40,
            starts: 5,
        }
    }
}

/// Result of a segmented regression run.
///
/// `estimates` is empty unless the run converged; keys are `const`,
/// `alpha1..=alpha{k+1}`, `beta1..=beta{k}` and `breakpoint1..=breakpoint{k}`.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentedFit {
    pub n_breakpoints: usize,
    pub converged: bool,
    pub iterations: usize,
    pub rss: Option<f64>,
    pub estimates: BTreeMap<String, f64>,
}

impl SegmentedFit {
    fn failed(n_breakpoints: usize) -> Self {
        Self {
            n_breakpoints,
            converged: false,
            iterations: 0,
            rss: None,
            estimates: BTreeMap::new(),
        }
    }

    /// Look up a named estimate.
    pub fn estimate(&self, key: &str) -> Option<f64> {
        self.estimates.get(key).copied()
    }

    /// The `index`-th breakpoint (1-based), if estimated.
    pub fn breakpoint(&self, index: usize) -> Option<f64> {
        self.estimate(&format!("breakpoint{}", index))
    }

    /// Raw output as JSON, used for diagnostics.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

struct Candidate {
    breakpoints: Vec<f64>,
    rss: f64,
    iterations: usize,
}

impl SegmentedRegression {
    /// Fit a continuous piecewise-linear model with `n_breakpoints` breakpoints.
    ///
    /// Non-convergence is not an error: the returned fit carries
    /// `converged == false` and no estimates.
    pub fn fit(&self, x: &[f64], y: &[f64], n_breakpoints: usize) -> AnalysisResult<SegmentedFit> {
        if x.len() != y.len() {
            return Err(AnalysisError::Validation(format!(
                "x and y must have the same length ({} != {})",
                x.len(),
                y.len()
            )));
        }
        if n_breakpoints == 0 {
            return Err(AnalysisError::Validation(
                "segmented regression needs at least one breakpoint".to_string(),
            ));
        }

        // const, slope, and a hinge plus a step column per breakpoint
        let parameters = 2 + 2 * n_breakpoints;
        if x.len() <= parameters || x.iter().chain(y).any(|v| !v.is_finite()) {
            tracing::debug!(
                points = x.len(),
                n_breakpoints,
                "segmented regression skipped: not enough usable points"
            );
            return Ok(SegmentedFit::failed(n_breakpoints));
        }

        let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = x_max - x_min;
        if range <= 0.0 {
            return Ok(SegmentedFit::failed(n_breakpoints));
        }

        let lower = x_min + self.min_distance_to_edge * range;
        let upper = x_max - self.min_distance_to_edge * range;
        let target = DVector::from_column_slice(y);

        let mut best: Option<Candidate> = None;
        for start in self.grid_starts(x, &target, n_breakpoints, lower, upper, range) {
            match self.refine(x, &target, start, lower, upper, range) {
                Some(candidate) => {
                    if best.as_ref().map_or(true, |b| candidate.rss < b.rss) {
                        best = Some(candidate);
                    }
                }
                None => tracing::trace!("segmented regression start did not converge"),
            }
        }

        let Some(best) = best else {
            tracing::warn!(n_breakpoints, "segmented regression failed to converge from any start");
            return Ok(SegmentedFit::failed(n_breakpoints));
        };

        let Some(coefficients) = hinge_fit(x, &target, &best.breakpoints).map(|f| f.coefficients) else {
            return Ok(SegmentedFit::failed(n_breakpoints));
        };

        let mut estimates = BTreeMap::new();
        estimates.insert("const".to_string(), coefficients[0]);
        let mut alpha = coefficients[1];
        estimates.insert("alpha1".to_string(), alpha);
        for (j, psi) in best.breakpoints.iter().enumerate() {
            let beta = coefficients[2 + j];
            alpha += beta;
            estimates.insert(format!("beta{}", j + 1), beta);
            estimates.insert(format!("breakpoint{}", j + 1), *psi);
            estimates.insert(format!("alpha{}", j + 2), alpha);
        }

        tracing::debug!(
            n_breakpoints,
            iterations = best.iterations,
            rss = best.rss,
            breakpoints = ?best.breakpoints,
            "segmented regression converged"
        );

        Ok(SegmentedFit {
            n_breakpoints,
            converged: true,
            iterations: best.iterations,
            rss: Some(best.rss),
            estimates,
        })
    }

    /// Best ordered breakpoint tuples on a uniform grid, by hinge-model RSS.
    fn grid_starts(
        &self,
        x: &[f64],
        target: &DVector<f64>,
        n_breakpoints: usize,
        lower: f64,
        upper: f64,
        range: f64,
    ) -> Vec<Vec<f64>> {
        let m = self.grid_points.max(2);
        let grid: Vec<f64> = (0..m)
            .map(|i| lower + (upper - lower) * i as f64 / (m - 1) as f64)
            .collect();
        let separation = self.min_distance_between_breakpoints * range;

        let mut scored: Vec<(f64, Vec<f64>)> = Vec::new();
        let mut tuple = Vec::with_capacity(n_breakpoints);
        collect_tuples(&grid, 0, n_breakpoints, separation, &mut tuple, &mut |psi: &[f64]| {
            if let Some(fit) = hinge_fit(x, target, psi) {
                scored.push((fit.rss, psi.to_vec()));
            }
        });

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored
            .into_iter()
            .take(self.starts.max(1))
            .map(|(_, psi)| psi)
            .collect()
    }

    /// Iterate `ψ ← ψ + γ/β` from `start`; `None` on divergence or an invalid configuration.
    fn refine(
        &self,
        x: &[f64],
        target: &DVector<f64>,
        start: Vec<f64>,
        lower: f64,
        upper: f64,
        range: f64,
    ) -> Option<Candidate> {
        let k = start.len();
        let separation = self.min_distance_between_breakpoints * range;
        let mut psi = start;

        for iteration in 1..=self.max_iterations {
            let design = DMatrix::from_fn(x.len(), 2 + 2 * k, |i, j| match j {
                0 => 1.0,
                1 => x[i],
                j if j < 2 + k => (x[i] - psi[j - 2]).max(0.0),
                j => {
                    if x[i] > psi[j - 2 - k] {
                        -1.0
                    } else {
                        0.0
                    }
                }
            });
            let coefficients = least_squares(&design, target)?.coefficients;

            let mut next = Vec::with_capacity(k);
            for j in 0..k {
                let beta = coefficients[2 + j];
                let gamma = coefficients[2 + k + j];
                if beta.abs() < 1e-12 {
                    return None;
                }
                next.push(psi[j] + gamma / beta);
            }
            next.sort_by(|a, b| a.total_cmp(b));

            let valid = next.iter().all(|p| p.is_finite() && *p >= lower && *p <= upper)
                && next.windows(2).all(|w| w[1] - w[0] >= separation);
            if !valid {
                return None;
            }

            let shift = next
                .iter()
                .zip(&psi)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0_f64, f64::max);
            psi = next;
            tracing::trace!(iteration, shift, breakpoints = ?psi, "breakpoint update");

            if shift <= self.tolerance * range {
                let rss = hinge_fit(x, target, &psi)?.rss;
                return Some(Candidate {
                    breakpoints: psi,
                    rss,
                    iterations: iteration,
                });
            }
        }
        None
    }
}

fn collect_tuples(
    grid: &[f64],
    from: usize,
    remaining: usize,
    separation: f64,
    tuple: &mut Vec<f64>,
    visit: &mut dyn FnMut(&[f64]),
) {
    if remaining == 0 {
        visit(tuple);
        return;
    }
    for i in from..grid.len() {
        if tuple.last().map_or(true, |last| grid[i] - last >= separation) {
            tuple.push(grid[i]);
            collect_tuples(grid, i + 1, remaining - 1, separation, tuple, visit);
            tuple.pop();
        }
    }
}

/// Continuous hinge model with fixed breakpoints.
fn hinge_fit(x: &[f64], target: &DVector<f64>, breakpoints: &[f64]) -> Option<super::lstsq::LeastSquares> {
    let design = DMatrix::from_fn(x.len(), 2 + breakpoints.len(), |i, j| match j {
        0 => 1.0,
        1 => x[i],
        j => (x[i] - breakpoints[j - 2]).max(0.0),
    });
    least_squares(&design, target)
}
