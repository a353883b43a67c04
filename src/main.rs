use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use travel_planner::{PlannerConfig, logging, web};

/// Travel planner: stay recommendations and itineraries from a crew of planning agents
#[derive(Debug, Parser)]
#[command(name = "travel-planner", version, about)]
struct Cli {
    /// Config file (defaults to the user config dir, then ./config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PlannerConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging, cli.verbose)?;
    if let Some(path) = &cli.config {
        tracing::info!("Using config from: {}", path.display());
    }

    web::run(config).await
}
