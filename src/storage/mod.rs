//! Configuration and session files.

pub mod config;
pub mod session;

pub use config::{
    default_config_path, load_config, save_config, AnalysisConfig, ConfigError, PlotSettings,
};
pub use session::{load_session, Report, Session};
