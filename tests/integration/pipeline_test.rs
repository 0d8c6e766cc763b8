//! Integration tests: session file to report, configuration, and model lifecycle.

use approx::assert_abs_diff_eq;
use lactate_threshold::storage::{load_config, load_session, save_config, AnalysisConfig};
use lactate_threshold::thresholds::{
    CurveMethod, DirectLookup, DualBreakpoint, FitOptions, StrategyKind, ThresholdModel,
    ThresholdResult,
};
use lactate_threshold::AnalysisError;
use tempfile::tempdir;

const INTENSITY: [f64; 6] = [100.0, 120.0, 140.0, 160.0, 180.0, 200.0];
const LACTATE: [f64; 6] = [1.0, 1.2, 1.8, 2.9, 4.5, 7.0];

#[test]
fn test_session_to_json_report() {
    let dir = tempdir().unwrap();
    let session_path = dir.path().join("session.toml");
    std::fs::write(
        &session_path,
        r#"
intensity = [100.0, 120.0, 140.0, 160.0, 180.0, 200.0]
lactate = [1.0, 1.2, 1.8, 2.9, 4.5, 7.0]
strategy = "dmax"

[fit]
method = "3rd_poly"
"#,
    )
    .unwrap();

    let mut config = AnalysisConfig::default();
    config.plot.samples = 25;
    let config_path = dir.path().join("config.toml");
    save_config(&config, &config_path).unwrap();

    let config = load_config(&config_path).unwrap();
    let session = load_session(&session_path).unwrap();
    let report = session.evaluate(&config).unwrap();

    assert_eq!(report.strategy, StrategyKind::Dmax);
    assert_eq!(report.method, CurveMethod::ThirdDegreePolynomial);
    let dmax = report.result.single().unwrap();
    assert_abs_diff_eq!(dmax, 155.1, epsilon = 0.5);
    assert_eq!(report.plot.curve.len(), 25);

    let chord = report.plot.reference_line.unwrap();
    assert_eq!(chord[0], [100.0, 1.0]);
    assert_eq!(chord[1], [200.0, 7.0]);

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["strategy"], "dmax");
    assert_eq!(json["method"], "3th_poly");
    assert!(json["result"].is_number());
}

#[test]
fn test_pair_report_serializes_both_thresholds() {
    let x: Vec<f64> = (0..=20).map(|i| 100.0 + 5.0 * i as f64).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|v| 1.0 + 0.01 * (v - 100.0) + 0.03 * (v - 130.0).max(0.0) + 0.11 * (v - 170.0).max(0.0))
        .collect();

    let mut model = DualBreakpoint::new();
    model
        .fit(&x, &y, &FitOptions::with_method(CurveMethod::CubicSpline))
        .unwrap();
    let result = model.predict(None).unwrap();

    let (lt1, lt2) = result.pair().unwrap();
    assert!(lt1 < lt2);
    let json = serde_json::to_value(result).unwrap();
    assert_eq!(json["lt1"], lt1);
    assert_eq!(json["lt2"], lt2);
}

#[test]
fn test_obla_on_measured_series() {
    let mut model = DirectLookup::new();
    model
        .fit(&INTENSITY, &LACTATE, &FitOptions::with_method(CurveMethod::ThirdDegreePolynomial))
        .unwrap();

    let intensity = model.intensity_at(3.5).unwrap();
    assert!(intensity > 160.0 && intensity < 180.0);
    assert_abs_diff_eq!(intensity, 168.6, epsilon = 0.5);
}

#[test]
fn test_refit_discards_previous_state() {
    let mut model = StrategyKind::Obla.build();
    model
        .fit(&INTENSITY, &LACTATE, &FitOptions::default())
        .unwrap();
    assert!(model.fitted().is_some());

    // A failed refit leaves the model unfitted rather than stale
    let result = model.fit(&INTENSITY, &LACTATE[..5], &FitOptions::default());
    assert!(matches!(result, Err(AnalysisError::Validation(_))));
    assert!(model.fitted().is_none());
    assert!(matches!(model.predict(Some(4.0)), Err(AnalysisError::NotFitted)));
}

#[test]
fn test_exponential_target_below_asymptote() {
    let x: Vec<f64> = INTENSITY.to_vec();
    let y: Vec<f64> = x.iter().map(|v| 0.02 * (0.03 * v).exp() + 0.8).collect();

    let mut model = StrategyKind::Obla.build();
    model
        .fit(&x, &y, &FitOptions::with_method(CurveMethod::Exponential))
        .unwrap();

    assert!(matches!(model.predict(Some(0.5)), Err(AnalysisError::Domain(_))));
    assert!(matches!(model.predict(Some(4.0)), Ok(ThresholdResult::Single(_))));
}

#[test]
fn test_every_strategy_on_measured_series() {
    let options = FitOptions::with_method(CurveMethod::ThirdDegreePolynomial);
    for kind in [
        StrategyKind::Obla,
        StrategyKind::Bsln,
        StrategyKind::Dmax,
        StrategyKind::Lt1Si,
        StrategyKind::Lt1SiLowest,
    ] {
        let mut model = kind.build();
        model.fit(&INTENSITY, &LACTATE, &options).unwrap();
        let target = kind.needs_target().then_some(2.0);
        let value = model.predict(target).unwrap().single().unwrap();
        assert!((100.0..=200.0).contains(&value), "{} gave {}", kind, value);
    }
}

fn cubic_series(offset: f64) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..6).map(|i| offset + 20.0 * i as f64).collect();
    let y = x.iter().map(|v| 1.0 + 6.0 * ((v - offset) / 100.0).powi(3)).collect();
    (x, y)
}

fn three_segment_series(offset: f64) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..=20).map(|i| offset + 5.0 * i as f64).collect();
    let y = x
        .iter()
        .map(|v| {
            let w = v - offset;
            1.0 + 0.01 * w + 0.03 * (w - 30.0).max(0.0) + 0.11 * (w - 70.0).max(0.0)
        })
        .collect();
    (x, y)
}

fn log_log_series(knee: f64) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..=20).map(|i| 100.0 + 5.0 * i as f64).collect();
    let y = x
        .iter()
        .map(|v| (0.3 * (v.ln() - 100.0_f64.ln()) + 3.7 * (v.ln() - knee.ln()).max(0.0)).exp())
        .collect();
    (x, y)
}

#[test]
fn test_refit_replaces_state_for_every_strategy() {
    for kind in StrategyKind::ALL {
        let (first, second, options) = match kind {
            StrategyKind::Lt1LogLog => (
                log_log_series(150.0),
                log_log_series(180.0),
                FitOptions::with_method(CurveMethod::CubicSpline),
            ),
            StrategyKind::Lt1Lt2 | StrategyKind::Lt2 => (
                three_segment_series(100.0),
                three_segment_series(200.0),
                FitOptions::with_method(CurveMethod::CubicSpline),
            ),
            _ => (cubic_series(100.0), cubic_series(200.0), FitOptions::default()),
        };
        let target = match kind {
            StrategyKind::Obla => Some(3.5),
            StrategyKind::Bsln => Some(2.5),
            _ => None,
        };

        let mut reused = kind.build();
        reused.fit(&first.0, &first.1, &options).unwrap();
        let before = reused.predict(target).unwrap();

        reused.fit(&second.0, &second.1, &options).unwrap();
        let after = reused.predict(target).unwrap();

        let mut fresh = kind.build();
        fresh.fit(&second.0, &second.1, &options).unwrap();
        let expected = fresh.predict(target).unwrap();

        assert_eq!(after, expected, "{} kept state from the first fit", kind);
        assert_ne!(after, before, "{} ignored the second fit", kind);

        let reused_fit = reused.fitted().unwrap();
        let fresh_fit = fresh.fitted().unwrap();
        assert_eq!(reused_fit.curve().domain(), fresh_fit.curve().domain(), "{}", kind);
        assert_eq!(reused_fit.display_dataset().x(), second.0.as_slice(), "{}", kind);

        // Shifted series move every intensity threshold along with the data
        if kind != StrategyKind::Lt1LogLog {
            for (a, b) in before.values().iter().zip(after.values()) {
                assert_abs_diff_eq!(b - a, 100.0, epsilon = 1.0);
            }
        }
    }
}

