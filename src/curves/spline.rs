//! Interpolating cubic-spline curve.

use serde::Serialize;

use super::{CurveParams, Domain};
use crate::error::AnalysisResult;
use crate::numeric::{PiecewisePolynomial, Roots};

/// Cubic spline passing exactly through every data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplineCurve {
    spline: PiecewisePolynomial,
    domain: Domain,
}

impl SplineCurve {
    /// Interpolate the data. `x` must be strictly increasing.
    pub fn fit(x: &[f64], y: &[f64]) -> AnalysisResult<Self> {
        Ok(Self {
            spline: PiecewisePolynomial::interpolate(x, y)?,
            domain: Domain::of(x),
        })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.spline.evaluate(x)
    }

    /// Roots of `s(x) = y`, enumerated per segment.
    pub fn solve(&self, y: f64) -> Roots {
        self.spline.solve(y)
    }

    /// Piecewise derivative over the same breaks.
    pub fn derivative(&self) -> Self {
        Self {
            spline: self.spline.derivative(),
            domain: self.domain,
        }
    }

    pub fn params(&self) -> CurveParams {
        CurveParams::CubicSpline {
            breaks: self.spline.breaks().to_vec(),
            coefficients: self.spline.coefficients().to_vec(),
            min_domain: self.domain.min,
            max_domain: self.domain.max,
        }
    }
}
