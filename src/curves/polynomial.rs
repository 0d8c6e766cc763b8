//! Least-squares polynomial curve.

use std::ops::RangeInclusive;

use serde::Serialize;

use super::{CurveParams, Domain};
use crate::error::{AnalysisError, AnalysisResult};
use crate::numeric::polynomial::{self, Roots};

/// Polynomial fitted by ordinary least squares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolynomialCurve {
    /// Ascending powers.
    coefficients: Vec<f64>,
    domain: Domain,
}

impl PolynomialCurve {
    /// Degrees accepted by [`PolynomialCurve::fit`].
    pub const SUPPORTED_DEGREES: RangeInclusive<usize> = 2..=4;

    /// Fit a polynomial of degree 2, 3 or 4.
    pub fn fit(x: &[f64], y: &[f64], degree: usize) -> AnalysisResult<Self> {
        if !Self::SUPPORTED_DEGREES.contains(&degree) {
            return Err(AnalysisError::Validation(format!(
                "unsupported polynomial degree {} (expected 2 to 4)",
                degree
            )));
        }

        Ok(Self {
            coefficients: polynomial::polyfit(x, y, degree)?,
            domain: Domain::of(x),
        })
    }

    /// Build from known coefficients (ascending powers).
    pub fn from_coefficients(coefficients: Vec<f64>, domain: Domain) -> Self {
        Self {
            coefficients,
            domain,
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        polynomial::evaluate(&self.coefficients, x)
    }

    /// Every real root of `p(x) = y`.
    pub fn solve(&self, y: f64) -> Roots {
        let mut shifted = self.coefficients.clone();
        if let Some(constant) = shifted.first_mut() {
            *constant -= y;
        }
        polynomial::real_roots(&polynomial::trim_negligible(&shifted, self.domain.radius()))
    }

    /// Analytic derivative, one degree lower.
    pub fn derivative(&self) -> Self {
        Self {
            coefficients: polynomial::derivative(&self.coefficients),
            domain: self.domain,
        }
    }

    pub fn params(&self) -> CurveParams {
        CurveParams::Polynomial {
            coefficients: self.coefficients.clone(),
            min_domain: self.domain.min,
            max_domain: self.domain.max,
        }
    }
}
