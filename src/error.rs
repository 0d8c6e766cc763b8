//! Analysis error types.

use thiserror::Error;

/// Errors that can occur while fitting a lactate curve or estimating a threshold.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Malformed input, rejected before any fitting is attempted.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The numerical fit failed or the data is degenerate for the chosen model.
    #[error("Fit failed: {0}")]
    Fit(String),

    /// The requested target lies outside the fitted curve's valid domain.
    #[error("Out of domain: {0}")]
    Domain(String),

    /// Curve inversion found more than one root inside the fitted domain.
    #[error("Ambiguous solution: {} roots found in [{min}, {max}]: {roots:?}", roots.len())]
    AmbiguousSolution {
        /// Every in-domain root, ascending.
        roots: Vec<f64>,
        /// Lower domain bound.
        min: f64,
        /// Upper domain bound.
        max: f64,
    },

    /// Segmented regression did not return the expected breakpoint.
    #[error("'{key}' not found in regression results, try a different threshold method. Result: {output}")]
    BreakpointNotFound {
        /// Missing estimate key, e.g. `breakpoint2`.
        key: String,
        /// Raw regression output for diagnosis.
        output: String,
    },

    /// `predict` was called before a successful `fit`.
    #[error("Model has not been fitted")]
    NotFitted,
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
