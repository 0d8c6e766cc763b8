//! Unit tests for the curve adaptor across all model families.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use lactate_threshold::curves::{CurveAdaptor, CurveKind, CurveParams};
use lactate_threshold::AnalysisError;

fn stages() -> Vec<f64> {
    (0..6).map(|i| 100.0 + 20.0 * i as f64).collect()
}

fn cubic(x: f64) -> f64 {
    1.0 + 6.0 * ((x - 100.0) / 100.0).powi(3)
}

// =============================================================================
// Polynomial
// =============================================================================

#[test]
fn test_polynomial_degrees() {
    let x = stages();
    let y: Vec<f64> = x.iter().map(|v| cubic(*v)).collect();

    for degree in [3, 4] {
        let curve = CurveAdaptor::fit(CurveKind::Polynomial { degree }, &x, &y).unwrap();
        assert_eq!(curve.kind(), CurveKind::Polynomial { degree });
        for (xi, yi) in x.iter().zip(&y) {
            assert_abs_diff_eq!(curve.predict(*xi), *yi, epsilon = 1e-8);
        }
        assert_abs_diff_eq!(curve.predict_inverse(3.5).unwrap(), 174.6901, epsilon = 1e-3);
    }
}

#[test]
fn test_polynomial_unsupported_degree() {
    let x = stages();
    let y: Vec<f64> = x.iter().map(|v| cubic(*v)).collect();
    let result = CurveAdaptor::fit(CurveKind::Polynomial { degree: 5 }, &x, &y);
    assert!(matches!(result, Err(AnalysisError::Validation(_))));
}

#[test]
fn test_polynomial_underdetermined() {
    let result = CurveAdaptor::fit(
        CurveKind::Polynomial { degree: 4 },
        &[100.0, 120.0, 140.0],
        &[1.0, 1.5, 2.5],
    );
    assert!(matches!(result, Err(AnalysisError::Fit(_))));
}

// =============================================================================
// Cubic spline
// =============================================================================

#[test]
fn test_spline_interpolates_and_inverts() {
    let x = stages();
    let y = [1.0, 1.2, 1.8, 2.9, 4.5, 7.0];
    let curve = CurveAdaptor::fit(CurveKind::CubicSpline, &x, &y).unwrap();

    for (xi, yi) in x.iter().zip(&y) {
        assert_abs_diff_eq!(curve.predict(*xi), *yi, epsilon = 1e-9);
    }
    // Knot values invert exactly
    assert_abs_diff_eq!(curve.predict_inverse(2.9).unwrap(), 160.0, epsilon = 1e-6);
}

#[test]
fn test_spline_derivative_of_cubic_data() {
    let x = stages();
    let y: Vec<f64> = x.iter().map(|v| cubic(*v)).collect();
    let derivative = CurveAdaptor::fit(CurveKind::CubicSpline, &x, &y)
        .unwrap()
        .differentiate();

    // d/dx 6((x-100)/100)^3 = 18 (x-100)^2 / 100^3
    assert_abs_diff_eq!(derivative.predict(150.0), 18.0 * 2500.0 / 1e6, epsilon = 1e-9);
    assert_eq!(derivative.domain().min, 100.0);
    assert_eq!(derivative.domain().max, 200.0);
}

// =============================================================================
// Exponential
// =============================================================================

#[test]
fn test_exponential_fit_and_asymptote() {
    let x = stages();
    let y: Vec<f64> = x.iter().map(|v| 0.02 * (0.03 * v).exp() + 0.8).collect();
    let curve = CurveAdaptor::fit(CurveKind::Exponential, &x, &y).unwrap();

    match curve.params() {
        CurveParams::Exponential { a, b, c, .. } => {
            assert_relative_eq!(a, 0.02, max_relative = 1e-4);
            assert_relative_eq!(b, 0.03, max_relative = 1e-4);
            assert_relative_eq!(c, 0.8, max_relative = 1e-4);
        }
        other => panic!("unexpected params {:?}", other),
    }

    let x_at_4 = curve.predict_inverse(4.0).unwrap();
    assert_abs_diff_eq!(curve.predict(x_at_4), 4.0, epsilon = 1e-9);

    // Below the asymptote there is no solution at all
    assert!(matches!(curve.predict_inverse(0.5), Err(AnalysisError::Domain(_))));
}

#[test]
fn test_exponential_degenerate_data() {
    let x = stages();
    let y = vec![2.0; x.len()];
    let result = CurveAdaptor::fit(CurveKind::Exponential, &x, &y);
    assert!(matches!(result, Err(AnalysisError::Fit(_))));
}

// =============================================================================
// Inversion policy
// =============================================================================

#[test]
fn test_inverse_above_fitted_range() {
    let x = stages();
    let y: Vec<f64> = x.iter().map(|v| cubic(*v)).collect();
    let curve = CurveAdaptor::fit(CurveKind::Polynomial { degree: 3 }, &x, &y).unwrap();
    assert!(matches!(curve.predict_inverse(20.0), Err(AnalysisError::Domain(_))));
}

#[test]
fn test_inverse_of_u_shape_is_ambiguous() {
    let x = stages();
    let y: Vec<f64> = x.iter().map(|v| 1.0 + ((v - 150.0) / 50.0).powi(2)).collect();
    let curve = CurveAdaptor::fit(CurveKind::Polynomial { degree: 2 }, &x, &y).unwrap();

    match curve.predict_inverse(1.5) {
        Err(AnalysisError::AmbiguousSolution { roots, min, max }) => {
            assert_eq!(roots.len(), 2);
            assert!(roots[0] < roots[1]);
            assert_eq!((min, max), (100.0, 200.0));
        }
        other => panic!("expected ambiguity, got {:?}", other),
    }
}
