//! Test sessions: one graded exercise test and the strategy to run on it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::config::{AnalysisConfig, ConfigError};
use crate::error::AnalysisResult;
use crate::plotting::PlotData;
use crate::thresholds::{CurveMethod, FitOptions, StrategyKind, ThresholdResult};

/// One graded exercise test.
///
/// ```toml
/// intensity = [100.0, 120.0, 140.0, 160.0, 180.0, 200.0]
/// lactate = [1.0, 1.2, 1.8, 2.9, 4.5, 7.0]
/// strategy = "obla"
/// target = 4.0
///
/// [fit]
/// method = "3rd_poly"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Stage intensities (power, speed, ...)
    pub intensity: Vec<f64>,
    /// Blood lactate per stage, mmol/L
    pub lactate: Vec<f64>,
    /// Strategy to run
    pub strategy: StrategyKind,
    /// Target lactate (OBLA) or offset above baseline (Bsln)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    /// Fit options; replaces the configured defaults when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<FitOptions>,
}

/// Outcome of evaluating a session.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub strategy: StrategyKind,
    pub method: CurveMethod,
    pub result: ThresholdResult,
    pub plot: PlotData,
}

/// Load a session from a TOML file.
pub fn load_session(path: &Path) -> Result<Session, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

impl Session {
    /// Fit options in effect under `config`.
    pub fn options(&self, config: &AnalysisConfig) -> FitOptions {
        self.fit.unwrap_or(config.fit)
    }

    /// Fit the session's strategy and predict its threshold.
    pub fn evaluate(&self, config: &AnalysisConfig) -> AnalysisResult<Report> {
        let options = self.options(config);
        tracing::info!(
            "Evaluating {} on {} stages with {}",
            self.strategy,
            self.intensity.len(),
            options.method
        );

        let mut model = self.strategy.build();
        model.fit(&self.intensity, &self.lactate, &options)?;
        let result = model.predict(self.target)?;
        tracing::debug!("{} result: {:?}", self.strategy, result);

        let plot = PlotData::from_model(model.as_ref(), &result, config.plot.samples)?;

        Ok(Report {
            strategy: self.strategy,
            method: options.method,
            result,
            plot,
        })
    }
}
