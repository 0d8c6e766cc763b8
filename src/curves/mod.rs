//! Fitted lactate curves.
//!
//! A [`CurveAdaptor`] fits one of three model families to (intensity,
//! lactate) pairs and supports evaluation, inversion and differentiation.
//! Inversion is strict: it succeeds only when exactly one root lies inside
//! the fitted domain.

pub mod exponential;
pub mod polynomial;
pub mod spline;

use serde::{Deserialize, Serialize};

pub use exponential::ExponentialCurve;
pub use polynomial::PolynomialCurve;
pub use spline::SplineCurve;

use crate::error::{AnalysisError, AnalysisResult};
use crate::numeric::Roots;

/// Closed interval of the fitting data's x values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    /// Domain spanned by the samples. Empty input yields an inverted, empty domain.
    pub fn of(x: &[f64]) -> Self {
        Self {
            min: x.iter().copied().fold(f64::INFINITY, f64::min),
            max: x.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Width of the interval.
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Round-off slack applied at the bounds.
    pub fn tolerance(&self) -> f64 {
        1e-9 * self.width().abs().max(1.0)
    }

    /// Membership test, tolerant to round-off at the bounds.
    pub fn contains(&self, value: f64) -> bool {
        let slack = self.tolerance();
        value >= self.min - slack && value <= self.max + slack
    }

    /// Largest absolute coordinate, the natural scale of global polynomials.
    pub fn radius(&self) -> f64 {
        self.min.abs().max(self.max.abs())
    }
}

/// Which model family to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Ordinary least-squares polynomial of degree 2, 3 or 4.
    Polynomial { degree: usize },
    /// Exact not-a-knot cubic-spline interpolation.
    CubicSpline,
    /// `a·e^(b·x) + c` by nonlinear least squares.
    Exponential,
}

impl std::fmt::Display for CurveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurveKind::Polynomial { degree } => write!(f, "polynomial (degree {})", degree),
            CurveKind::CubicSpline => write!(f, "cubic spline"),
            CurveKind::Exponential => write!(f, "exponential"),
        }
    }
}

/// Snapshot of fitted parameters and domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveParams {
    Polynomial {
        /// Ascending powers.
        coefficients: Vec<f64>,
        min_domain: f64,
        max_domain: f64,
    },
    CubicSpline {
        breaks: Vec<f64>,
        /// Local coefficients per segment, ascending powers of `x − break`.
        coefficients: Vec<Vec<f64>>,
        min_domain: f64,
        max_domain: f64,
    },
    Exponential {
        a: f64,
        b: f64,
        c: f64,
        min_domain: f64,
        max_domain: f64,
    },
}

/// A fitted curve of one of the supported families.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CurveAdaptor {
    Polynomial(PolynomialCurve),
    CubicSpline(SplineCurve),
    Exponential(ExponentialCurve),
}

impl CurveAdaptor {
    /// Fit a curve of the given family.
    pub fn fit(kind: CurveKind, x: &[f64], y: &[f64]) -> AnalysisResult<Self> {
        let curve = match kind {
            CurveKind::Polynomial { degree } => {
                CurveAdaptor::Polynomial(PolynomialCurve::fit(x, y, degree)?)
            }
            CurveKind::CubicSpline => CurveAdaptor::CubicSpline(SplineCurve::fit(x, y)?),
            CurveKind::Exponential => CurveAdaptor::Exponential(ExponentialCurve::fit(x, y)?),
        };

        let domain = curve.domain();
        tracing::debug!(
            %kind,
            points = x.len(),
            min_domain = domain.min,
            max_domain = domain.max,
            "fitted lactate curve"
        );
        Ok(curve)
    }

    /// Model family of this curve.
    pub fn kind(&self) -> CurveKind {
        match self {
            CurveAdaptor::Polynomial(p) => CurveKind::Polynomial { degree: p.degree() },
            CurveAdaptor::CubicSpline(_) => CurveKind::CubicSpline,
            CurveAdaptor::Exponential(_) => CurveKind::Exponential,
        }
    }

    /// Domain of the fitting data.
    pub fn domain(&self) -> Domain {
        match self {
            CurveAdaptor::Polynomial(p) => p.domain(),
            CurveAdaptor::CubicSpline(s) => s.domain(),
            CurveAdaptor::Exponential(e) => e.domain(),
        }
    }

    /// Evaluate at `x`. Extrapolation is allowed.
    pub fn predict(&self, x: f64) -> f64 {
        match self {
            CurveAdaptor::Polynomial(p) => p.evaluate(x),
            CurveAdaptor::CubicSpline(s) => s.evaluate(x),
            CurveAdaptor::Exponential(e) => e.evaluate(x),
        }
    }

    /// Evaluate at each point.
    pub fn predict_many(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|v| self.predict(*v)).collect()
    }

    /// The unique `x` within the fitted domain where the curve equals `y`.
    ///
    /// Fails with `Domain` when no in-domain root exists (or, for the
    /// exponential family, no real root at all) and with
    /// `AmbiguousSolution` when more than one does.
    pub fn predict_inverse(&self, y: f64) -> AnalysisResult<f64> {
        if !y.is_finite() {
            return Err(AnalysisError::Validation(format!(
                "inversion target must be finite, got {}",
                y
            )));
        }

        let roots = match self {
            CurveAdaptor::Polynomial(p) => p.solve(y),
            CurveAdaptor::CubicSpline(s) => s.solve(y),
            CurveAdaptor::Exponential(e) => e.solve(y)?,
        };
        unique_root(roots, y, self.domain())
    }

    /// The derivative curve, independently owned, over the same domain.
    pub fn differentiate(&self) -> CurveAdaptor {
        match self {
            CurveAdaptor::Polynomial(p) => CurveAdaptor::Polynomial(p.derivative()),
            CurveAdaptor::CubicSpline(s) => CurveAdaptor::CubicSpline(s.derivative()),
            CurveAdaptor::Exponential(e) => CurveAdaptor::Exponential(e.derivative()),
        }
    }

    /// Fitted parameters and domain.
    pub fn params(&self) -> CurveParams {
        match self {
            CurveAdaptor::Polynomial(p) => p.params(),
            CurveAdaptor::CubicSpline(s) => s.params(),
            CurveAdaptor::Exponential(e) => e.params(),
        }
    }
}

fn unique_root(roots: Roots, target: f64, domain: Domain) -> AnalysisResult<f64> {
    match roots.filter(|r| domain.contains(r)) {
        // Flat at the target across the domain
        Roots::Infinite => Err(AnalysisError::AmbiguousSolution {
            roots: vec![domain.min, domain.max],
            min: domain.min,
            max: domain.max,
        }),
        Roots::Finite(roots) => match roots.as_slice() {
            [] => Err(AnalysisError::Domain(format!(
                "no solution for y = {} in [{}, {}]",
                target, domain.min, domain.max
            ))),
            [root] => Ok(root.clamp(domain.min, domain.max)),
            _ => Err(AnalysisError::AmbiguousSolution {
                roots,
                min: domain.min,
                max: domain.max,
            }),
        },
    }
}
