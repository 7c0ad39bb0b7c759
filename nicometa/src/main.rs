mod server;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use nicometa_api::AppState;
use nicometa_core::{bootstrap::load_config, logging};

/// Normalized niconico video metadata over HTTP
#[derive(Debug, Parser)]
#[command(name = "nicometa", version, about)]
struct Cli {
    /// Path to a YAML/TOML/JSON config file
    #[arg(short, long, env = "NICOMETA_CONFIG_PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load and validate configuration
    let config = load_config(cli.config.as_deref())?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("nicometa starting...");
    info!("Upstream: {}", config.upstream.base_url);

    // 3. Build the lookup pipeline once; handlers only read it
    let state = AppState::from_config(&config.upstream)?;

    // 4. Serve until a shutdown signal arrives
    server::serve(&config.http_address(), state).await
}
