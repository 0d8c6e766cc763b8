//! Render-ready figure data for a fitted threshold model.
//!
//! Rendering itself lives outside this crate; consumers get the measured
//! points, a sampled curve overlay and the threshold markers.

use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::thresholds::{ThresholdModel, ThresholdResult};

/// Default number of curve samples.
pub const DEFAULT_SAMPLES: usize = 100;

/// Figure data for one model.
#[derive(Debug, Clone, Serialize)]
pub struct PlotData {
    /// Figure title, e.g. "dmax fit (4th_poly)".
    pub title: String,
    /// Measured points, raw when the strategy retained them.
    pub points: Vec<[f64; 2]>,
    /// Fitted curve sampled evenly over its domain, in the same units as `points`.
    pub curve: Vec<[f64; 2]>,
    /// Vertical markers at the threshold intensities.
    pub markers: Vec<f64>,
    /// Strategy-specific reference line (the Dmax chord).
    pub reference_line: Option<[[f64; 2]; 2]>,
}

impl PlotData {
    /// Collect figure data from a fitted model and its prediction.
    pub fn from_model(
        model: &dyn ThresholdModel,
        result: &ThresholdResult,
        samples: usize,
    ) -> AnalysisResult<Self> {
        let fitted = model.fitted().ok_or(AnalysisError::NotFitted)?;
        let samples = samples.max(2);

        let display = fitted.display_dataset();
        let points = display
            .x()
            .iter()
            .zip(display.y())
            .map(|(x, y)| [*x, *y])
            .collect();

        let curve = fitted.curve();
        let domain = curve.domain();
        let curve_points = (0..samples)
            .map(|i| {
                let x = domain.min + domain.width() * i as f64 / (samples - 1) as f64;
                model.to_display([x, curve.predict(x)])
            })
            .collect();

        Ok(Self {
            title: format!("{} fit ({})", model.name(), fitted.method()),
            points,
            curve: curve_points,
            markers: result.values(),
            reference_line: model.reference_line(),
        })
    }
}
