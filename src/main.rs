//! Lactate threshold CLI
//!
//! Usage: `lactate-threshold <session.toml> [config.toml]`
//!
//! Evaluates the session's strategy and prints the threshold and plot data as JSON.

use anyhow::{bail, Context};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lactate_threshold::storage::{default_config_path, load_config, load_session};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting lactate-threshold v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args_os().skip(1);
    let Some(session_path) = args.next().map(PathBuf::from) else {
        bail!("usage: lactate-threshold <session.toml> [config.toml]");
    };
    let config_path = args.next().map(PathBuf::from).unwrap_or_else(default_config_path);

    let config = load_config(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let session = load_session(&session_path)
        .with_context(|| format!("failed to load session {}", session_path.display()))?;

    let report = session
        .evaluate(&config)
        .with_context(|| format!("{} failed", session.strategy))?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
