//! Shared helpers for the webhook administration binary.

use std::path::Path;

use anyhow::Context;
use photosync_core::PhotoSyncConfig;
use serde::Serialize;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Read the config file as written, without environment overrides.
/// A missing file yields the defaults.
pub fn read_config_file(path: &Path) -> anyhow::Result<PhotoSyncConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found");
        return Ok(PhotoSyncConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(PhotoSyncConfig::from_json_str(&raw)?)
}

/// First non-empty value in the order flag, config file, environment.
pub fn first_non_empty(candidates: [Option<&str>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}
