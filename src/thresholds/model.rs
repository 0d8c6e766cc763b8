//! Shared fit/predict machinery for every threshold strategy.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use crate::curves::{CurveAdaptor, CurveKind};
use crate::error::{AnalysisError, AnalysisResult};

/// Curve family selected by name when fitting a threshold model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveMethod {
    /// 3rd degree polynomial.
    #[serde(rename = "3th_poly", alias = "3rd_poly")]
    ThirdDegreePolynomial,
    /// 4th degree polynomial.
    #[default]
    #[serde(rename = "4th_poly")]
    FourthDegreePolynomial,
    /// Interpolating cubic spline.
    #[serde(rename = "spline")]
    CubicSpline,
    /// `a·e^(b·x) + c`.
    #[serde(rename = "exp")]
    Exponential,
}

impl CurveMethod {
    /// Every selectable method.
    pub const ALL: [CurveMethod; 4] = [
        CurveMethod::ThirdDegreePolynomial,
        CurveMethod::FourthDegreePolynomial,
        CurveMethod::CubicSpline,
        CurveMethod::Exponential,
    ];

    /// Curve family this method fits.
    pub fn kind(self) -> CurveKind {
        match self {
            CurveMethod::ThirdDegreePolynomial => CurveKind::Polynomial { degree: 3 },
            CurveMethod::FourthDegreePolynomial => CurveKind::Polynomial { degree: 4 },
            CurveMethod::CubicSpline => CurveKind::CubicSpline,
            CurveMethod::Exponential => CurveKind::Exponential,
        }
    }

    /// Identifier as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            CurveMethod::ThirdDegreePolynomial => "3th_poly",
            CurveMethod::FourthDegreePolynomial => "4th_poly",
            CurveMethod::CubicSpline => "spline",
            CurveMethod::Exponential => "exp",
        }
    }
}

impl std::fmt::Display for CurveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3th_poly" | "3rd_poly" => Ok(CurveMethod::ThirdDegreePolynomial),
            "4th_poly" => Ok(CurveMethod::FourthDegreePolynomial),
            "spline" => Ok(CurveMethod::CubicSpline),
            "exp" => Ok(CurveMethod::Exponential),
            other => Err(AnalysisError::Validation(format!("Unknown method: {}", other))),
        }
    }
}

/// Dmax variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmaxImplementation {
    /// Chord between the first and last measurement.
    #[default]
    Normal,
    /// Drop near-baseline points before fitting.
    Modified,
}

impl std::fmt::Display for DmaxImplementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DmaxImplementation::Normal => write!(f, "normal"),
            DmaxImplementation::Modified => write!(f, "modified"),
        }
    }
}

impl FromStr for DmaxImplementation {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(DmaxImplementation::Normal),
            "modified" => Ok(DmaxImplementation::Modified),
            other => Err(AnalysisError::Validation(format!(
                "Unknown Dmax implementation: {}",
                other
            ))),
        }
    }
}

/// Options consumed by `fit`. Each strategy reads the fields it needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Curve family.
    pub method: CurveMethod,
    /// Standard increment in mmol/L (standard-increment strategies).
    pub si: f64,
    /// Dmax variant.
    #[serde(rename = "impl", alias = "implementation")]
    pub implementation: DmaxImplementation,
    /// Intensity offset above the first stage dropped by modified Dmax.
    pub threshold_above_baseline: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            method: CurveMethod::default(),
            si: 0.5,
            implementation: DmaxImplementation::default(),
            threshold_above_baseline: 0.5,
        }
    }
}

impl FitOptions {
    /// Default options with the given curve method.
    pub fn with_method(method: CurveMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }
}

/// Threshold intensity, or the (LT1, LT2) pair for dual-threshold strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ThresholdResult {
    Single(f64),
    Pair { lt1: f64, lt2: f64 },
}

impl ThresholdResult {
    /// The single threshold, if this is not a pair.
    pub fn single(&self) -> Option<f64> {
        match self {
            ThresholdResult::Single(v) => Some(*v),
            ThresholdResult::Pair { .. } => None,
        }
    }

    /// The (LT1, LT2) pair, if this is one.
    pub fn pair(&self) -> Option<(f64, f64)> {
        match self {
            ThresholdResult::Single(_) => None,
            ThresholdResult::Pair { lt1, lt2 } => Some((*lt1, *lt2)),
        }
    }

    /// Every threshold intensity, ascending for pairs.
    pub fn values(&self) -> Vec<f64> {
        match self {
            ThresholdResult::Single(v) => vec![*v],
            ThresholdResult::Pair { lt1, lt2 } => vec![*lt1, *lt2],
        }
    }
}

/// Dataset and curve produced by a successful fit.
#[derive(Debug, Clone)]
pub struct FittedModel {
    method: CurveMethod,
    dataset: Dataset,
    raw_dataset: Option<Dataset>,
    curve: CurveAdaptor,
}

impl FittedModel {
    /// Fit `method` to `dataset`. `raw_dataset` keeps the untransformed
    /// points for display when the strategy filtered or transformed them.
    pub fn fit(
        dataset: Dataset,
        raw_dataset: Option<Dataset>,
        method: CurveMethod,
    ) -> AnalysisResult<Self> {
        let curve = CurveAdaptor::fit(method.kind(), dataset.x(), dataset.y())?;
        Ok(Self {
            method,
            dataset,
            raw_dataset,
            curve,
        })
    }

    pub fn method(&self) -> CurveMethod {
        self.method
    }

    /// Dataset the curve was fitted to.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Untransformed input, when retained.
    pub fn raw_dataset(&self) -> Option<&Dataset> {
        self.raw_dataset.as_ref()
    }

    /// Points to show in a figure: the raw input when retained, else the fitting data.
    pub fn display_dataset(&self) -> &Dataset {
        self.raw_dataset.as_ref().unwrap_or(&self.dataset)
    }

    pub fn curve(&self) -> &CurveAdaptor {
        &self.curve
    }
}

/// Common interface of the threshold strategies.
///
/// `fit` discards any previous state before doing anything else, so a failed
/// refit leaves the model unfitted rather than holding stale results.
pub trait ThresholdModel {
    /// Strategy identifier, e.g. `dmax`.
    fn name(&self) -> &'static str;

    /// Validate, transform and fit.
    fn fit(&mut self, x: &[f64], y: &[f64], options: &FitOptions) -> AnalysisResult<()>;

    /// Threshold estimate. `target` is the lactate concentration for OBLA
    /// and the offset above the lowest value for the baseline strategy;
    /// the other strategies ignore it.
    fn predict(&self, target: Option<f64>) -> AnalysisResult<ThresholdResult>;

    /// Fitted state, `None` before a successful `fit`.
    fn fitted(&self) -> Option<&FittedModel>;

    /// Reference line drawn with the fit, if the strategy has one.
    fn reference_line(&self) -> Option<[[f64; 2]; 2]> {
        None
    }

    /// Map a point of the fitted curve into the units of the displayed data.
    fn to_display(&self, point: [f64; 2]) -> [f64; 2] {
        point
    }
}

pub(crate) fn require_target(strategy: &str, target: Option<f64>) -> AnalysisResult<f64> {
    match target {
        Some(value) if value.is_finite() => Ok(value),
        Some(value) => Err(AnalysisError::Validation(format!(
            "{} target must be finite, got {}",
            strategy, value
        ))),
        None => Err(AnalysisError::Validation(format!(
            "{} requires a target lactate value",
            strategy
        ))),
    }
}
