//! Thresholds from segmented-regression breakpoints.
//!
//! These strategies fit a curve for consistency with the other models (and
//! for display), but derive their thresholds from a piecewise-linear
//! regression run at predict time.

use super::dataset::Dataset;
use super::model::{FitOptions, FittedModel, ThresholdModel, ThresholdResult};
use crate::error::{AnalysisError, AnalysisResult};
use crate::numeric::{SegmentedFit, SegmentedRegression};

/// Breakpoint `index` (1-based) or a `BreakpointNotFound` carrying the raw result.
fn breakpoint(fit: &SegmentedFit, index: usize) -> AnalysisResult<f64> {
    fit.breakpoint(index)
        .ok_or_else(|| AnalysisError::BreakpointNotFound {
            key: format!("breakpoint{}", index),
            output: fit.to_json(),
        })
}

fn regress(
    regression: &SegmentedRegression,
    fitted: Option<&FittedModel>,
    n_breakpoints: usize,
) -> AnalysisResult<SegmentedFit> {
    let dataset = fitted.ok_or(AnalysisError::NotFitted)?.dataset();
    regression.fit(dataset.x(), dataset.y(), n_breakpoints)
}

/// LT1 as the single breakpoint of lactate against intensity on log-log axes.
#[derive(Debug, Clone, Default)]
pub struct LogLogBreakpoint {
    regression: SegmentedRegression,
    fitted: Option<FittedModel>,
}

impl LogLogBreakpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom segmented-regression settings.
    pub fn with_regression(regression: SegmentedRegression) -> Self {
        Self {
            regression,
            fitted: None,
        }
    }

    /// Raw segmented-regression result on the log-log series.
    pub fn regression(&self) -> AnalysisResult<SegmentedFit> {
        regress(&self.regression, self.fitted.as_ref(), 1)
    }

    /// LT1 intensity in the original units.
    pub fn threshold(&self) -> AnalysisResult<f64> {
        let fit = self.regression()?;
        breakpoint(&fit, 1).map(f64::exp)
    }
}

impl ThresholdModel for LogLogBreakpoint {
    fn name(&self) -> &'static str {
        "lt1_loglog"
    }

    fn fit(&mut self, x: &[f64], y: &[f64], options: &FitOptions) -> AnalysisResult<()> {
        self.fitted = None;
        let raw = Dataset::new(x, y)?;
        let logged = raw.log_transform()?;

        tracing::debug!(strategy = self.name(), method = %options.method, points = logged.len(), "fitting");
        self.fitted = Some(FittedModel::fit(logged, Some(raw), options.method)?);
        Ok(())
    }

    fn predict(&self, _target: Option<f64>) -> AnalysisResult<ThresholdResult> {
        self.threshold().map(ThresholdResult::Single)
    }

    fn fitted(&self) -> Option<&FittedModel> {
        self.fitted.as_ref()
    }

    /// The curve is fitted on log-log axes; points and markers are in intensity units.
    fn to_display(&self, point: [f64; 2]) -> [f64; 2] {
        [point[0].exp(), point[1].exp()]
    }
}

/// LT1 and LT2 as the two breakpoints of a three-segment regression.
#[derive(Debug, Clone, Default)]
pub struct DualBreakpoint {
    regression: SegmentedRegression,
    fitted: Option<FittedModel>,
}

impl DualBreakpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom segmented-regression settings.
    pub fn with_regression(regression: SegmentedRegression) -> Self {
        Self {
            regression,
            fitted: None,
        }
    }

    /// Raw segmented-regression result.
    pub fn regression(&self) -> AnalysisResult<SegmentedFit> {
        regress(&self.regression, self.fitted.as_ref(), 2)
    }

    /// (LT1, LT2), ascending.
    pub fn thresholds(&self) -> AnalysisResult<(f64, f64)> {
        let fit = self.regression()?;
        Ok((breakpoint(&fit, 1)?, breakpoint(&fit, 2)?))
    }
}

impl ThresholdModel for DualBreakpoint {
    fn name(&self) -> &'static str {
        "lt1_lt2"
    }

    fn fit(&mut self, x: &[f64], y: &[f64], options: &FitOptions) -> AnalysisResult<()> {
        self.fitted = None;
        let raw = Dataset::new(x, y)?;

        tracing::debug!(strategy = self.name(), method = %options.method, points = raw.len(), "fitting");
        self.fitted = Some(FittedModel::fit(raw.clone(), Some(raw), options.method)?);
        Ok(())
    }

    fn predict(&self, _target: Option<f64>) -> AnalysisResult<ThresholdResult> {
        let (lt1, lt2) = self.thresholds()?;
        Ok(ThresholdResult::Pair { lt1, lt2 })
    }

    fn fitted(&self) -> Option<&FittedModel> {
        self.fitted.as_ref()
    }
}

/// LT2 as the second breakpoint of a three-segment regression.
#[derive(Debug, Clone, Default)]
pub struct SingleBreakpointSecond {
    regression: SegmentedRegression,
    fitted: Option<FittedModel>,
}

impl SingleBreakpointSecond {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom segmented-regression settings.
    pub fn with_regression(regression: SegmentedRegression) -> Self {
        Self {
            regression,
            fitted: None,
        }
    }

    /// Raw segmented-regression result.
    pub fn regression(&self) -> AnalysisResult<SegmentedFit> {
        regress(&self.regression, self.fitted.as_ref(), 2)
    }

    pub fn threshold(&self) -> AnalysisResult<f64> {
        let fit = self.regression()?;
        breakpoint(&fit, 2)
    }
}

impl ThresholdModel for SingleBreakpointSecond {
    fn name(&self) -> &'static str {
        "lt2"
    }

    fn fit(&mut self, x: &[f64], y: &[f64], options: &FitOptions) -> AnalysisResult<()> {
        self.fitted = None;
        let dataset = Dataset::new(x, y)?;

        tracing::debug!(strategy = self.name(), method = %options.method, points = dataset.len(), "fitting");
        self.fitted = Some(FittedModel::fit(dataset, None, options.method)?);
        Ok(())
    }

    fn predict(&self, _target: Option<f64>) -> AnalysisResult<ThresholdResult> {
        self.threshold().map(ThresholdResult::Single)
    }

    fn fitted(&self) -> Option<&FittedModel> {
        self.fitted.as_ref()
    }
}
