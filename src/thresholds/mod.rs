//! Lactate threshold strategies.
//!
//! Every strategy implements [`ThresholdModel`]: `fit` validates the data,
//! applies the strategy's filter or transform, and fits a curve; `predict`
//! derives one threshold or an (LT1, LT2) pair from that state.
//!
//! - OBLA: intensity at a fixed lactate concentration
//! - Bsln: OBLA relative to the lowest measured lactate
//! - Dmax: maximal deviation from the chord (normal or modified)
//! - LT1_si / LT1_si_lowest: standard increment above a baseline
//! - LT1_loglog: single breakpoint on log-log axes
//! - LT1_LT2 / LT2: breakpoints of a three-segment regression

pub mod breakpoint;
pub mod dataset;
pub mod dmax;
pub mod lookup;
pub mod model;
pub mod standard_increment;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use breakpoint::{DualBreakpoint, LogLogBreakpoint, SingleBreakpointSecond};
pub use dataset::Dataset;
pub use dmax::{Dmax, MaximalDeviation};
pub use lookup::{BaselineOffset, Bsln, DirectLookup, Obla};
pub use model::{
    CurveMethod, DmaxImplementation, FitOptions, FittedModel, ThresholdModel, ThresholdResult,
};
pub use standard_increment::{StandardIncrement, StandardIncrementFromMinimum};

use crate::error::AnalysisError;

/// Strategy selector by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Obla,
    Bsln,
    Dmax,
    #[serde(rename = "lt1_si")]
    Lt1Si,
    #[serde(rename = "lt1_si_lowest")]
    Lt1SiLowest,
    #[serde(rename = "lt1_loglog")]
    Lt1LogLog,
    #[serde(rename = "lt1_lt2")]
    Lt1Lt2,
    Lt2,
}

impl StrategyKind {
    /// Every strategy.
    pub const ALL: [StrategyKind; 8] = [
        StrategyKind::Obla,
        StrategyKind::Bsln,
        StrategyKind::Dmax,
        StrategyKind::Lt1Si,
        StrategyKind::Lt1SiLowest,
        StrategyKind::Lt1LogLog,
        StrategyKind::Lt1Lt2,
        StrategyKind::Lt2,
    ];

    /// Identifier as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Obla => "obla",
            StrategyKind::Bsln => "bsln",
            StrategyKind::Dmax => "dmax",
            StrategyKind::Lt1Si => "lt1_si",
            StrategyKind::Lt1SiLowest => "lt1_si_lowest",
            StrategyKind::Lt1LogLog => "lt1_loglog",
            StrategyKind::Lt1Lt2 => "lt1_lt2",
            StrategyKind::Lt2 => "lt2",
        }
    }

    /// Whether `predict` needs a target value.
    pub fn needs_target(self) -> bool {
        matches!(self, StrategyKind::Obla | StrategyKind::Bsln)
    }

    /// Fresh, unfitted model.
    pub fn build(self) -> Box<dyn ThresholdModel> {
        match self {
            StrategyKind::Obla => Box::new(DirectLookup::new()),
            StrategyKind::Bsln => Box::new(BaselineOffset::new()),
            StrategyKind::Dmax => Box::new(MaximalDeviation::new()),
            StrategyKind::Lt1Si => Box::new(StandardIncrement::new()),
            StrategyKind::Lt1SiLowest => Box::new(StandardIncrementFromMinimum::new()),
            StrategyKind::Lt1LogLog => Box::new(LogLogBreakpoint::new()),
            StrategyKind::Lt1Lt2 => Box::new(DualBreakpoint::new()),
            StrategyKind::Lt2 => Box::new(SingleBreakpointSecond::new()),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| AnalysisError::Validation(format!("Unknown strategy: {}", s)))
    }
}
