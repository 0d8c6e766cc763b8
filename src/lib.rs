//! Lactate threshold estimation
//!
//! Fits a curve (polynomial, cubic spline or exponential) to the blood lactate
//! measurements of a graded exercise test and derives the intensity at which
//! a threshold is crossed. Eight strategies are provided: OBLA, Bsln, Dmax,
//! LT1_si, LT1_si_lowest, LT1_loglog, LT1_LT2 and LT2.

pub mod curves;
pub mod error;
pub mod numeric;
pub mod plotting;
pub mod storage;
pub mod thresholds;

// Re-export commonly used types
pub use curves::{CurveAdaptor, CurveKind, Domain};
pub use error::{AnalysisError, AnalysisResult};
pub use plotting::PlotData;
pub use storage::{AnalysisConfig, Session};
pub use thresholds::{
    CurveMethod, Dataset, DmaxImplementation, FitOptions, StrategyKind, ThresholdModel,
    ThresholdResult,
};
