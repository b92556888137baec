use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use photosync_api::{setup, telemetry};
use photosync_core::{ConfigSource, PhotoSyncConfig};

/// Telegram media ingestion server
#[derive(Debug, Parser)]
#[command(name = "photosync", version)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "PHOTOSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides server.port and PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let (mut config, source) = PhotoSyncConfig::load_with_source(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _log_guard = telemetry::init_tracing(&config.logging);
    tracing::info!(version = photosync_core::constants::VERSION, "Starting PhotoSync");
    match &source {
        ConfigSource::File(path) => tracing::info!(path = %path.display(), "Configuration loaded"),
        ConfigSource::Defaults(path) => tracing::warn!(
            path = %path.display(),
            "Config file not found, using built-in defaults"
        ),
    }

    let (_state, router) = setup::initialize_app(config.clone()).await?;
    setup::server::start_server(&config, router).await?;

    Ok(())
}
