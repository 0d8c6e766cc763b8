//! Dmax: point of maximal distance between the fitted curve and its chord.
//!
//! The maximal perpendicular distance occurs where the curve's slope equals
//! the chord's slope, so the threshold is found by inverting the derivative.

use super::dataset::Dataset;
use super::model::{DmaxImplementation, FitOptions, FittedModel, ThresholdModel, ThresholdResult};
use crate::curves::CurveAdaptor;
use crate::error::{AnalysisError, AnalysisResult};

#[derive(Debug, Clone)]
struct DmaxState {
    fitted: FittedModel,
    derivative: CurveAdaptor,
    chord_slope: f64,
}

/// Maximal-deviation threshold, in normal or modified form.
#[derive(Debug, Clone, Default)]
pub struct MaximalDeviation {
    state: Option<DmaxState>,
}

/// Dmax under its usual name.
pub type Dmax = MaximalDeviation;

impl MaximalDeviation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slope of the chord between the first and last fitted points.
    pub fn chord_slope(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.chord_slope)
    }

    /// Cached derivative of the fitted curve.
    pub fn derivative(&self) -> Option<&CurveAdaptor> {
        self.state.as_ref().map(|s| &s.derivative)
    }

    /// Intensity where the curve's slope matches the chord.
    pub fn threshold(&self) -> AnalysisResult<f64> {
        let state = self.state.as_ref().ok_or(AnalysisError::NotFitted)?;
        state.derivative.predict_inverse(state.chord_slope)
    }
}

impl ThresholdModel for MaximalDeviation {
    fn name(&self) -> &'static str {
        "dmax"
    }

    fn fit(&mut self, x: &[f64], y: &[f64], options: &FitOptions) -> AnalysisResult<()> {
        self.state = None;
        let raw = Dataset::new(x, y)?;

        let (dataset, raw_dataset) = match options.implementation {
            DmaxImplementation::Normal => (raw, None),
            DmaxImplementation::Modified => {
                if !options.threshold_above_baseline.is_finite() {
                    return Err(AnalysisError::Validation(format!(
                        "threshold_above_baseline must be finite, got {}",
                        options.threshold_above_baseline
                    )));
                }
                let cutoff = raw.first().0 + options.threshold_above_baseline;
                let filtered = raw.retain(|xi, _| xi > cutoff).ok_or_else(|| {
                    AnalysisError::Fit(format!(
                        "no measurements above intensity {} remain after baseline filtering",
                        cutoff
                    ))
                })?;
                (filtered, Some(raw))
            }
        };

        let (x_first, y_first) = dataset.first();
        let (x_last, y_last) = dataset.last();
        if x_last == x_first {
            return Err(AnalysisError::Fit(
                "Dmax chord is undefined: first and last intensities coincide".to_string(),
            ));
        }
        let chord_slope = (y_last - y_first) / (x_last - x_first);

        tracing::debug!(
            strategy = self.name(),
            method = %options.method,
            implementation = %options.implementation,
            points = dataset.len(),
            chord_slope,
            "fitting"
        );

        let fitted = FittedModel::fit(dataset, raw_dataset, options.method)?;
        let derivative = fitted.curve().differentiate();
        self.state = Some(DmaxState {
            fitted,
            derivative,
            chord_slope,
        });
        Ok(())
    }

    fn predict(&self, _target: Option<f64>) -> AnalysisResult<ThresholdResult> {
        self.threshold().map(ThresholdResult::Single)
    }

    fn fitted(&self) -> Option<&FittedModel> {
        self.state.as_ref().map(|s| &s.fitted)
    }

    fn reference_line(&self) -> Option<[[f64; 2]; 2]> {
        let dataset = self.fitted()?.dataset();
        let (x0, y0) = dataset.first();
        let (x1, y1) = dataset.last();
        Some([[x0, y0], [x1, y1]])
    }
}
