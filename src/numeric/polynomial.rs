//! Polynomial least squares, evaluation and real root finding.
//!
//! Coefficients are stored in ascending powers: `c[0] + c[1]·x + c[2]·x² + …`.

use nalgebra::{DMatrix, DVector};

use super::lstsq::least_squares;
use crate::error::{AnalysisError, AnalysisResult};

/// Imaginary parts below this (relative) magnitude are considered real.
const REALNESS_TOLERANCE: f64 = 1e-7;

/// Roots closer than this (relative) distance are merged.
const DUPLICATE_TOLERANCE: f64 = 1e-9;

/// Newton iterations applied to each eigenvalue root.
const POLISH_STEPS: usize = 8;

/// Terms contributing less than this fraction of the largest term are dropped.
const NEGLIGIBLE_TERM: f64 = 1e-11;

/// Real solutions of a polynomial equation.
#[derive(Debug, Clone, PartialEq)]
pub enum Roots {
    /// Finitely many real roots, ascending.
    Finite(Vec<f64>),
    /// Every real number is a root (the polynomial is identically zero).
    Infinite,
}

impl Roots {
    /// Keep only roots accepted by `keep`. `Infinite` is returned unchanged.
    pub fn filter(self, keep: impl Fn(f64) -> bool) -> Roots {
        match self {
            Roots::Finite(roots) => Roots::Finite(roots.into_iter().filter(|r| keep(*r)).collect()),
            Roots::Infinite => Roots::Infinite,
        }
    }
}

/// Least-squares polynomial fit of the given degree.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> AnalysisResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(AnalysisError::Validation(format!(
            "x and y must have the same length ({} != {})",
            x.len(),
            y.len()
        )));
    }

    let terms = degree + 1;
    if x.len() < terms {
        return Err(AnalysisError::Fit(format!(
            "degree {} polynomial needs at least {} points, got {}",
            degree,
            terms,
            x.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AnalysisError::Fit("non-finite value in polynomial fit input".to_string()));
    }

    let design = DMatrix::from_fn(x.len(), terms, |i, j| x[i].powi(j as i32));
    let target = DVector::from_column_slice(y);

    least_squares(&design, &target)
        .map(|fit| fit.coefficients)
        .ok_or_else(|| {
            AnalysisError::Fit(format!(
                "polynomial fit of degree {} is rank deficient (too few distinct x values)",
                degree
            ))
        })
}

/// Evaluate a polynomial with Horner's scheme.
pub fn evaluate(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Coefficients of the first derivative.
pub fn derivative(coefficients: &[f64]) -> Vec<f64> {
    if coefficients.len() <= 1 {
        return vec![0.0];
    }
    coefficients
        .iter()
        .enumerate()
        .skip(1)
        .map(|(power, c)| power as f64 * c)
        .collect()
}

/// Drop leading terms whose contribution over `|x| <= radius` is negligible.
///
/// Least-squares fits of exact lower-degree data leave round-off in the
/// leading coefficient, which would otherwise add spurious far-away roots.
pub fn trim_negligible(coefficients: &[f64], radius: f64) -> Vec<f64> {
    let radius = if radius.is_finite() && radius > 0.0 { radius } else { 1.0 };
    let magnitudes: Vec<f64> = coefficients
        .iter()
        .enumerate()
        .map(|(k, c)| c.abs() * radius.powi(k as i32))
        .collect();
    let largest = magnitudes.iter().copied().fold(0.0_f64, f64::max);
    if largest == 0.0 {
        return coefficients.to_vec();
    }

    let keep = magnitudes
        .iter()
        .rposition(|m| *m > NEGLIGIBLE_TERM * largest)
        .map_or(1, |last| last + 1);
    coefficients[..keep].to_vec()
}

/// All real roots of the polynomial.
///
/// Degrees 0 to 2 are solved in closed form; higher degrees use the
/// eigenvalues of the companion matrix, polished with Newton steps.
pub fn real_roots(coefficients: &[f64]) -> Roots {
    let effective = coefficients
        .iter()
        .rposition(|c| *c != 0.0)
        .map(|last| &coefficients[..=last])
        .unwrap_or(&[]);

    let mut roots = match effective.len() {
        0 => return Roots::Infinite,
        1 => Vec::new(),
        2 => vec![-effective[0] / effective[1]],
        3 => quadratic_roots(effective[0], effective[1], effective[2]),
        _ => companion_roots(effective),
    };

    roots.retain(|r| r.is_finite());
    roots.sort_by(|a, b| a.total_cmp(b));
    roots.dedup_by(|a, b| (*a - *b).abs() <= DUPLICATE_TOLERANCE * a.abs().max(b.abs()).max(1.0));
    Roots::Finite(roots)
}

fn quadratic_roots(c: f64, b: f64, a: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    if discriminant == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    // Avoid cancellation between -b and sqrt(disc)
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    if q == 0.0 {
        // b == 0 and c == 0
        return vec![0.0];
    }
    vec![q / a, c / q]
}

fn companion_roots(coefficients: &[f64]) -> Vec<f64> {
    let degree = coefficients.len() - 1;
    let leading = coefficients[degree];

    // Substitute x = s·t so the monic coefficients are of comparable size
    let scale = (1..=degree)
        .map(|k| (coefficients[degree - k] / leading).abs().powf(1.0 / k as f64))
        .fold(0.0_f64, f64::max);
    let scale = if scale > 0.0 && scale.is_finite() { scale } else { 1.0 };

    let monic: Vec<f64> = (0..degree)
        .map(|k| coefficients[k] / leading / scale.powi((degree - k) as i32))
        .collect();

    let mut companion = DMatrix::<f64>::zeros(degree, degree);
    for i in 1..degree {
        companion[(i, i - 1)] = 1.0;
    }
    for (i, c) in monic.iter().enumerate() {
        companion[(i, degree - 1)] = -c;
    }

    let slope = derivative(coefficients);
    companion
        .complex_eigenvalues()
        .iter()
        .filter(|z| z.im.abs() <= REALNESS_TOLERANCE * z.re.abs().max(1.0))
        .map(|z| polish(coefficients, &slope, z.re * scale))
        .collect()
}

fn polish(coefficients: &[f64], slope: &[f64], mut root: f64) -> f64 {
    for _ in 0..POLISH_STEPS {
        let value = evaluate(coefficients, root);
        let gradient = evaluate(slope, root);
        if value == 0.0 || gradient == 0.0 {
            break;
        }
        let next = root - value / gradient;
        if !next.is_finite() {
            break;
        }
        // Only accept steps that improve the residual
        if evaluate(coefficients, next).abs() > value.abs() {
            break;
        }
        root = next;
    }
    root
}
