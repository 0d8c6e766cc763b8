//! Numerical routines behind the curve adaptors and breakpoint strategies.
//!
//! - Least-squares polynomial fit and real root finding
//! - Exact cubic-spline interpolation (not-a-knot)
//! - Levenberg–Marquardt fit of `a·e^(b·x) + c`
//! - Segmented regression with breakpoint estimation

pub mod exponential;
pub mod lstsq;
pub mod polynomial;
pub mod segmented;
pub mod spline;

pub use exponential::{ExponentialParams, LevenbergMarquardt};
pub use polynomial::Roots;
pub use segmented::{SegmentedFit, SegmentedRegression};
pub use spline::PiecewisePolynomial;
