//! Validated (intensity, lactate) series.

use serde::Serialize;

use crate::curves::Domain;
use crate::error::{AnalysisError, AnalysisResult};

/// Paired intensity and lactate measurements from one graded test.
///
/// Always non-empty, equal-length and finite. Strategies derive filtered or
/// transformed copies; a dataset is never modified in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Dataset {
    /// Validate and copy caller-supplied series.
    pub fn new(x: &[f64], y: &[f64]) -> AnalysisResult<Self> {
        if x.len() != y.len() {
            return Err(AnalysisError::Validation(format!(
                "X and y must have the same length ({} != {})",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(AnalysisError::Validation("X and y must not be empty".to_string()));
        }
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::Validation(format!(
                "all elements in X must be finite numbers (index {} is {})",
                i, x[i]
            )));
        }
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::Validation(format!(
                "all elements in y must be finite numbers (index {} is {})",
                i, y[i]
            )));
        }

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    /// Intensities.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Lactate concentrations.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// First measurement.
    pub fn first(&self) -> (f64, f64) {
        (self.x[0], self.y[0])
    }

    /// Last measurement.
    pub fn last(&self) -> (f64, f64) {
        let i = self.len() - 1;
        (self.x[i], self.y[i])
    }

    /// Index of the lowest lactate value (first occurrence).
    pub fn argmin_y(&self) -> usize {
        self.y
            .iter()
            .enumerate()
            .fold(0, |best, (i, v)| if *v < self.y[best] { i } else { best })
    }

    /// Lowest lactate value.
    pub fn min_y(&self) -> f64 {
        self.y[self.argmin_y()]
    }

    /// Range of intensities.
    pub fn domain(&self) -> Domain {
        Domain::of(&self.x)
    }

    /// Points accepted by `keep`, or `None` when none are.
    pub fn retain(&self, keep: impl Fn(f64, f64) -> bool) -> Option<Dataset> {
        let (x, y): (Vec<f64>, Vec<f64>) = self
            .x
            .iter()
            .zip(&self.y)
            .filter(|(xi, yi)| keep(**xi, **yi))
            .map(|(xi, yi)| (*xi, *yi))
            .unzip();

        if x.is_empty() {
            None
        } else {
            Some(Dataset { x, y })
        }
    }

    /// Natural logarithm of both series. Every value must be strictly positive.
    pub fn log_transform(&self) -> AnalysisResult<Dataset> {
        if let Some(v) = self.x.iter().chain(&self.y).find(|v| **v <= 0.0) {
            return Err(AnalysisError::Fit(format!(
                "log transform requires strictly positive values, found {}",
                v
            )));
        }

        Ok(Dataset {
            x: self.x.iter().map(|v| v.ln()).collect(),
            y: self.y.iter().map(|v| v.ln()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch() {
        let result = Dataset::new(&[1.0, 2.0], &[1.0]);
        assert!(matches!(result, Err(AnalysisError::Validation(_))));
    }

    #[test]
    fn test_empty() {
        let result = Dataset::new(&[], &[]);
        assert!(matches!(result, Err(AnalysisError::Validation(_))));
    }

    #[test]
    fn test_non_finite() {
        assert!(Dataset::new(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
        assert!(Dataset::new(&[1.0, 2.0], &[1.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_argmin_first_occurrence() {
        let data = Dataset::new(&[1.0, 2.0, 3.0, 4.0], &[1.4, 1.0, 1.0, 2.0]).unwrap();
        assert_eq!(data.argmin_y(), 1);
        assert_eq!(data.min_y(), 1.0);
    }

    #[test]
    fn test_retain_does_not_modify_original() {
        let data = Dataset::new(&[100.0, 120.0, 140.0], &[1.0, 1.5, 2.0]).unwrap();
        let filtered = data.retain(|x, _| x > 110.0).unwrap();

        assert_eq!(filtered.x(), &[120.0, 140.0]);
        assert_eq!(data.len(), 3);
        assert!(data.retain(|x, _| x > 1000.0).is_none());
    }

    #[test]
    fn test_log_transform() {
        let data = Dataset::new(&[1.0, std::f64::consts::E], &[1.0, 1.0]).unwrap();
        let logged = data.log_transform().unwrap();
        assert!((logged.x()[1] - 1.0).abs() < 1e-12);

        let bad = Dataset::new(&[0.0, 1.0], &[1.0, 1.0]).unwrap();
        assert!(matches!(bad.log_transform(), Err(AnalysisError::Fit(_))));
    }
}
