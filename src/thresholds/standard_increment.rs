//! Standard-increment LT1: first meaningful rise above a baseline.
//!
//! The increment should match the smallest lactate change the analyser can
//! resolve.

use super::dataset::Dataset;
use super::model::{FitOptions, FittedModel, ThresholdModel, ThresholdResult};
use crate::error::{AnalysisError, AnalysisResult};

fn validate_increment(si: f64) -> AnalysisResult<()> {
    if si > 0.0 && si.is_finite() {
        Ok(())
    } else {
        Err(AnalysisError::Validation(format!(
            "Impossible lactate change to find LT1: {}",
            si
        )))
    }
}

#[derive(Debug, Clone)]
struct IncrementState {
    fitted: FittedModel,
    target: f64,
}

/// LT1 at the first measurement's lactate plus a standard increment.
#[derive(Debug, Clone, Default)]
pub struct StandardIncrement {
    state: Option<IncrementState>,
}

impl StandardIncrement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lactate concentration defining LT1.
    pub fn target_lactate(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.target)
    }

    pub fn threshold(&self) -> AnalysisResult<f64> {
        let state = self.state.as_ref().ok_or(AnalysisError::NotFitted)?;
        state.fitted.curve().predict_inverse(state.target)
    }
}

impl ThresholdModel for StandardIncrement {
    fn name(&self) -> &'static str {
        "lt1_si"
    }

    fn fit(&mut self, x: &[f64], y: &[f64], options: &FitOptions) -> AnalysisResult<()> {
        self.state = None;
        validate_increment(options.si)?;
        let dataset = Dataset::new(x, y)?;
        let target = dataset.first().1 + options.si;

        tracing::debug!(strategy = self.name(), method = %options.method, si = options.si, target, "fitting");
        let fitted = FittedModel::fit(dataset, None, options.method)?;
        self.state = Some(IncrementState { fitted, target });
        Ok(())
    }

    fn predict(&self, _target: Option<f64>) -> AnalysisResult<ThresholdResult> {
        self.threshold().map(ThresholdResult::Single)
    }

    fn fitted(&self) -> Option<&FittedModel> {
        self.state.as_ref().map(|s| &s.fitted)
    }
}

#[derive(Debug, Clone)]
struct LowestState {
    fitted: FittedModel,
    target: f64,
    baseline_intensity: f64,
}

/// LT1 at the lowest measured lactate plus a standard increment.
///
/// Only measurements at or beyond the lowest-lactate stage are fitted, and
/// the threshold must lie strictly beyond that stage.
#[derive(Debug, Clone, Default)]
pub struct StandardIncrementFromMinimum {
    state: Option<LowestState>,
}

impl StandardIncrementFromMinimum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lactate concentration defining LT1.
    pub fn target_lactate(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.target)
    }

    /// Intensity at the lowest-lactate measurement.
    pub fn baseline_intensity(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.baseline_intensity)
    }

    pub fn threshold(&self) -> AnalysisResult<f64> {
        let state = self.state.as_ref().ok_or(AnalysisError::NotFitted)?;
        let curve = state.fitted.curve();
        let intensity = curve.predict_inverse(state.target)?;
        // Roots within round-off of the baseline stage count as reaching it
        if intensity <= state.baseline_intensity + curve.domain().tolerance() {
            return Err(AnalysisError::Domain(format!(
                "predicted LT1 intensity {} is not greater than baseline intensity {}",
                intensity, state.baseline_intensity
            )));
        }
        Ok(intensity)
    }
}

impl ThresholdModel for StandardIncrementFromMinimum {
    fn name(&self) -> &'static str {
        "lt1_si_lowest"
    }

    fn fit(&mut self, x: &[f64], y: &[f64], options: &FitOptions) -> AnalysisResult<()> {
        self.state = None;
        validate_increment(options.si)?;
        let raw = Dataset::new(x, y)?;

        let lowest = raw.argmin_y();
        let baseline_intensity = raw.x()[lowest];
        let target = raw.y()[lowest] + options.si;

        let dataset = raw.retain(|xi, _| xi >= baseline_intensity).ok_or_else(|| {
            AnalysisError::Validation(
                "No X values greater than X at minimum Y. Cannot fit model.".to_string(),
            )
        })?;

        tracing::debug!(
            strategy = self.name(),
            method = %options.method,
            baseline_intensity,
            target,
            points = dataset.len(),
            "fitting"
        );
        let fitted = FittedModel::fit(dataset, Some(raw), options.method)?;
        self.state = Some(LowestState {
            fitted,
            target,
            baseline_intensity,
        });
        Ok(())
    }

    fn predict(&self, _target: Option<f64>) -> AnalysisResult<ThresholdResult> {
        self.threshold().map(ThresholdResult::Single)
    }

    fn fitted(&self) -> Option<&FittedModel> {
        self.state.as_ref().map(|s| &s.fitted)
    }
}
