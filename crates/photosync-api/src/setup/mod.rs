//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use photosync_core::PhotoSyncConfig;

use crate::state::AppState;

/// Build services and routes from a loaded configuration
pub async fn initialize_app(config: PhotoSyncConfig) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let state = services::initialize_services(config).await?;
    let router = routes::setup_routes(state.clone());

    tracing::info!(
        root = %state.store.root().display(),
        converter = state.converter(),
        auto_classification = state.orchestrator.classifier().is_enabled(),
        "Application initialized"
    );

    Ok((state, router))
}
