//! Tracing subscriber setup
//!
//! `RUST_LOG` wins over the configured level when set.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.pretty().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to initialise logging: {e}"))
}

/// Our crate at `level`; HTTP plumbing stays at info unless asked for
fn default_directives(level: &str) -> String {
    format!("warn,travel_planner={level},tower_http=info")
}
