//! Fixed-concentration lookups: OBLA and baseline-corrected OBLA.

use super::dataset::Dataset;
use super::model::{require_target, FitOptions, FittedModel, ThresholdModel, ThresholdResult};
use crate::error::{AnalysisError, AnalysisResult};

/// Onset of blood lactate accumulation: intensity at a fixed lactate concentration.
#[derive(Debug, Clone, Default)]
pub struct DirectLookup {
    fitted: Option<FittedModel>,
}

/// OBLA under its usual name.
pub type Obla = DirectLookup;

impl DirectLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intensity at which the fitted curve reaches `lactate`.
    pub fn intensity_at(&self, lactate: f64) -> AnalysisResult<f64> {
        let fitted = self.fitted.as_ref().ok_or(AnalysisError::NotFitted)?;
        fitted.curve().predict_inverse(lactate)
    }
}

impl ThresholdModel for DirectLookup {
    fn name(&self) -> &'static str {
        "obla"
    }

    fn fit(&mut self, x: &[f64], y: &[f64], options: &FitOptions) -> AnalysisResult<()> {
        self.fitted = None;
        let dataset = Dataset::new(x, y)?;
        tracing::debug!(strategy = self.name(), method = %options.method, points = dataset.len(), "fitting");
        self.fitted = Some(FittedModel::fit(dataset, None, options.method)?);
        Ok(())
    }

    fn predict(&self, target: Option<f64>) -> AnalysisResult<ThresholdResult> {
        let lactate = require_target(self.name(), target)?;
        self.intensity_at(lactate).map(ThresholdResult::Single)
    }

    fn fitted(&self) -> Option<&FittedModel> {
        self.fitted.as_ref()
    }
}

/// Intensity at a fixed rise above the lowest measured lactate.
#[derive(Debug, Clone, Default)]
pub struct BaselineOffset {
    fitted: Option<FittedModel>,
    baseline: f64,
}

/// Baseline-corrected OBLA under its usual name.
pub type Bsln = BaselineOffset;

impl BaselineOffset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest lactate value of the fitted data.
    pub fn baseline(&self) -> Option<f64> {
        self.fitted.as_ref().map(|_| self.baseline)
    }

    /// Intensity at which lactate reaches `offset` above the baseline.
    pub fn intensity_at(&self, offset: f64) -> AnalysisResult<f64> {
        let fitted = self.fitted.as_ref().ok_or(AnalysisError::NotFitted)?;
        fitted.curve().predict_inverse(offset + self.baseline)
    }
}

impl ThresholdModel for BaselineOffset {
    fn name(&self) -> &'static str {
        "bsln"
    }

    fn fit(&mut self, x: &[f64], y: &[f64], options: &FitOptions) -> AnalysisResult<()> {
        self.fitted = None;
        let dataset = Dataset::new(x, y)?;
        let baseline = dataset.min_y();
        tracing::debug!(strategy = self.name(), method = %options.method, baseline, "fitting");
        self.fitted = Some(FittedModel::fit(dataset, None, options.method)?);
        self.baseline = baseline;
        Ok(())
    }

    fn predict(&self, target: Option<f64>) -> AnalysisResult<ThresholdResult> {
        let offset = require_target(self.name(), target)?;
        self.intensity_at(offset).map(ThresholdResult::Single)
    }

    fn fitted(&self) -> Option<&FittedModel> {
        self.fitted.as_ref()
    }
}
