//! Unit tests for the threshold strategies, driven through `StrategyKind`.

use approx::assert_abs_diff_eq;
use lactate_threshold::thresholds::{
    Bsln, CurveMethod, DmaxImplementation, FitOptions, StandardIncrementFromMinimum, StrategyKind,
    ThresholdModel, ThresholdResult,
};
use lactate_threshold::AnalysisError;

/// Lactate = 1 + 6·((x − 100)/100)³, exactly representable by every method but `exp`.
fn cubic_test() -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..6).map(|i| 100.0 + 20.0 * i as f64).collect();
    let y = x.iter().map(|v| 1.0 + 6.0 * ((v - 100.0) / 100.0).powi(3)).collect();
    (x, y)
}

const EXACT_METHODS: [CurveMethod; 3] = [
    CurveMethod::ThirdDegreePolynomial,
    CurveMethod::FourthDegreePolynomial,
    CurveMethod::CubicSpline,
];

fn run(kind: StrategyKind, options: &FitOptions, target: Option<f64>) -> ThresholdResult {
    let (x, y) = cubic_test();
    let mut model = kind.build();
    model.fit(&x, &y, options).unwrap();
    model.predict(target).unwrap()
}

#[test]
fn test_obla_all_exact_methods() {
    for method in EXACT_METHODS {
        let result = run(StrategyKind::Obla, &FitOptions::with_method(method), Some(3.5));
        assert_abs_diff_eq!(result.single().unwrap(), 174.6901, epsilon = 1e-3);
    }
}

#[test]
fn test_bsln_matches_obla_above_baseline() {
    for method in EXACT_METHODS {
        let result = run(StrategyKind::Bsln, &FitOptions::with_method(method), Some(2.5));
        assert_abs_diff_eq!(result.single().unwrap(), 174.6901, epsilon = 1e-3);
    }
}

#[test]
fn test_bsln_caches_baseline() {
    let (x, y) = cubic_test();
    let mut model = Bsln::new();
    assert_eq!(model.baseline(), None);
    model.fit(&x, &y, &FitOptions::default()).unwrap();
    assert_eq!(model.baseline(), Some(1.0));
}

#[test]
fn test_dmax_all_exact_methods() {
    let expected = 100.0 + 100.0 / 3.0_f64.sqrt();
    for method in EXACT_METHODS {
        let result = run(StrategyKind::Dmax, &FitOptions::with_method(method), None);
        assert_abs_diff_eq!(result.single().unwrap(), expected, epsilon = 1e-3);
    }
}

#[test]
fn test_modified_dmax_moves_chord() {
    let options = FitOptions {
        implementation: DmaxImplementation::Modified,
        threshold_above_baseline: 10.0,
        ..FitOptions::with_method(CurveMethod::ThirdDegreePolynomial)
    };
    let normal = run(
        StrategyKind::Dmax,
        &FitOptions::with_method(CurveMethod::ThirdDegreePolynomial),
        None,
    );
    let modified = run(StrategyKind::Dmax, &options, None);

    // Chord from the second stage is steeper, so its tangent point moves right
    assert!(modified.single().unwrap() > normal.single().unwrap());
}

#[test]
fn test_lt1_si() {
    for method in EXACT_METHODS {
        let result = run(StrategyKind::Lt1Si, &FitOptions::with_method(method), None);
        assert_abs_diff_eq!(result.single().unwrap(), 143.6790, epsilon = 1e-3);
    }
}

#[test]
fn test_lt1_si_lowest_uses_post_minimum_data() {
    // Lactate dips before rising; baseline is the 1.0 at 120 W
    let x = [100.0, 120.0, 140.0, 160.0, 180.0, 200.0, 220.0];
    let y = [1.6, 1.0, 1.1, 1.5, 2.4, 3.9, 6.0];
    let options = FitOptions::with_method(CurveMethod::CubicSpline);

    let mut model = StandardIncrementFromMinimum::new();
    model.fit(&x, &y, &options).unwrap();
    assert_eq!(model.target_lactate(), Some(1.5));
    assert_eq!(model.baseline_intensity(), Some(120.0));
    assert_abs_diff_eq!(model.threshold().unwrap(), 160.0, epsilon = 1e-6);

    // Display keeps every measured point, the fit only those from the minimum on
    let fitted = model.fitted().unwrap();
    assert_eq!(fitted.dataset().len(), 6);
    assert_eq!(fitted.display_dataset().len(), 7);
}

#[test]
fn test_increment_validation() {
    let (x, y) = cubic_test();
    for kind in [StrategyKind::Lt1Si, StrategyKind::Lt1SiLowest] {
        for si in [0.0, -0.5, f64::NAN] {
            let options = FitOptions {
                si,
                ..Default::default()
            };
            let mut model = kind.build();
            let result = model.fit(&x, &y, &options);
            assert!(matches!(result, Err(AnalysisError::Validation(_))));
        }
    }
}

#[test]
fn test_target_required() {
    let (x, y) = cubic_test();
    for kind in StrategyKind::ALL.into_iter().filter(|k| k.needs_target()) {
        let mut model = kind.build();
        model.fit(&x, &y, &FitOptions::default()).unwrap();
        assert!(matches!(model.predict(None), Err(AnalysisError::Validation(_))));
    }
}

#[test]
fn test_every_strategy_requires_fit() {
    for kind in StrategyKind::ALL {
        let model = kind.build();
        assert!(model.fitted().is_none());
        assert!(matches!(model.predict(Some(4.0)), Err(AnalysisError::NotFitted)));
    }
}

#[test]
fn test_every_strategy_validates_lengths() {
    for kind in StrategyKind::ALL {
        let mut model = kind.build();
        let result = model.fit(&[100.0, 120.0, 140.0], &[1.0, 1.5], &FitOptions::default());
        assert!(matches!(result, Err(AnalysisError::Validation(_))), "{}", kind);
    }
}
