//! mintwatch - real-time launch-platform token scanner - entry point.
//!
//! Connects to the new-token feed, enriches each token via best-effort
//! secondary lookups, and maintains the bounded roster for display.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

/// Real-time launch-platform token scanner
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via MINTWATCH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    mintwatch_ws::init_crypto();

    // Parse command line arguments
    let args = Args::parse();

    // Determine config path: CLI arg > MINTWATCH_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("MINTWATCH_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config_exists = std::path::Path::new(&config_path).exists();
    let config = mintwatch_app::AppConfig::load(&config_path)?;

    // Initialize logging with the configured default filter
    mintwatch_telemetry::init_logging(&config.log_filter)?;

    info!("Starting mintwatch v{}", env!("CARGO_PKG_VERSION"));
    if config_exists {
        info!(config_path = %config_path, "Configuration loaded");
    } else {
        warn!(config_path = %config_path, "Config file not found, using defaults");
    }

    // Create and run the application
    let app = mintwatch_app::Application::new(config)?;
    app.run().await?;

    Ok(())
}
