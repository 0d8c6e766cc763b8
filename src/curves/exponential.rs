//! Exponential curve `y = a·e^(b·x) + c`.

use serde::Serialize;

use super::{CurveParams, Domain};
use crate::error::{AnalysisError, AnalysisResult};
use crate::numeric::{LevenbergMarquardt, Roots};

/// Exponential curve fitted by nonlinear least squares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExponentialCurve {
    a: f64,
    b: f64,
    c: f64,
    domain: Domain,
}

impl ExponentialCurve {
    /// Fit with Levenberg–Marquardt. Non-convergence is a `Fit` error.
    pub fn fit(x: &[f64], y: &[f64]) -> AnalysisResult<Self> {
        let params = LevenbergMarquardt::default().fit(x, y)?;
        Ok(Self {
            a: params.a,
            b: params.b,
            c: params.c,
            domain: Domain::of(x),
        })
    }

    /// Build from known parameters.
    pub fn from_params(a: f64, b: f64, c: f64, domain: Domain) -> Self {
        Self { a, b, c, domain }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// Horizontal asymptote.
    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.a * (self.b * x).exp() + self.c
    }

    /// Closed-form inverse. There is no real solution when `(y − c)/a <= 0`.
    pub fn solve(&self, y: f64) -> AnalysisResult<Roots> {
        let ratio = (y - self.c) / self.a;
        if !(ratio > 0.0) {
            return Err(AnalysisError::Domain(format!(
                "no real solution for y = {} (asymptote c = {}, a = {})",
                y, self.c, self.a
            )));
        }
        if self.b == 0.0 {
            // Constant curve a + c
            return Ok(if ratio == 1.0 {
                Roots::Infinite
            } else {
                Roots::Finite(Vec::new())
            });
        }
        Ok(Roots::Finite(vec![ratio.ln() / self.b]))
    }

    /// `a·b·e^(b·x)`, itself an exponential with zero asymptote.
    pub fn derivative(&self) -> Self {
        Self {
            a: self.a * self.b,
            b: self.b,
            c: 0.0,
            domain: self.domain,
        }
    }

    pub fn params(&self) -> CurveParams {
        CurveParams::Exponential {
            a: self.a,
            b: self.b,
            c: self.c,
            min_domain: self.domain.min,
            max_domain: self.domain.max,
        }
    }
}
