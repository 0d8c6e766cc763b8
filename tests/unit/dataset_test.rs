//! Unit tests for dataset validation and derived series.

use lactate_threshold::{AnalysisError, Dataset};

#[test]
fn test_dataset_accessors() {
    let data = Dataset::new(&[100.0, 120.0, 140.0, 160.0], &[1.4, 1.1, 1.1, 2.0]).unwrap();

    assert_eq!(data.len(), 4);
    assert!(!data.is_empty());
    assert_eq!(data.first(), (100.0, 1.4));
    assert_eq!(data.last(), (160.0, 2.0));
    // First occurrence of the minimum wins
    assert_eq!(data.argmin_y(), 1);
    assert_eq!(data.min_y(), 1.1);
    assert_eq!(data.domain().min, 100.0);
    assert_eq!(data.domain().max, 160.0);
}

#[test]
fn test_dataset_rejects_bad_input() {
    let cases: [(&[f64], &[f64]); 4] = [
        (&[1.0, 2.0], &[1.0]),
        (&[], &[]),
        (&[1.0, f64::NAN], &[1.0, 2.0]),
        (&[1.0, 2.0], &[1.0, f64::INFINITY]),
    ];

    for (x, y) in cases {
        assert!(matches!(Dataset::new(x, y), Err(AnalysisError::Validation(_))));
    }
}

#[test]
fn test_dataset_retain_keeps_source() {
    let data = Dataset::new(&[100.0, 120.0, 140.0], &[1.0, 1.5, 2.5]).unwrap();

    let upper = data.retain(|x, _| x > 110.0).unwrap();
    assert_eq!(upper.x(), &[120.0, 140.0]);
    assert_eq!(upper.y(), &[1.5, 2.5]);
    assert_eq!(data.len(), 3);

    assert!(data.retain(|x, _| x > 500.0).is_none());
}

#[test]
fn test_dataset_log_transform() {
    let data = Dataset::new(&[1.0, std::f64::consts::E], &[1.0, 1.0]).unwrap();
    let logged = data.log_transform().unwrap();
    assert_eq!(logged.x()[0], 0.0);
    assert!((logged.x()[1] - 1.0).abs() < 1e-12);

    let with_zero = Dataset::new(&[0.0, 1.0], &[1.0, 1.0]).unwrap();
    assert!(matches!(with_zero.log_transform(), Err(AnalysisError::Fit(_))));
}
