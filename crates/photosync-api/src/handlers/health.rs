//! Health check handler

use std::fmt::Display;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use photosync_core::constants::VERSION;
use serde::Serialize;

use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::state::AppState;

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

async fn check_root(root: &Path) -> Result<(), String> {
    let metadata = tokio::fs::metadata(root)
        .await
        .map_err(|e| e.to_string())?;
    if !metadata.is_dir() {
        return Err("not a directory".to_string());
    }
    if metadata.permissions().readonly() {
        return Err("read-only".to_string());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
    pub uptime: String,
    pub root_path: String,
    pub last_saved: Option<String>,
    pub converter: &'static str,
    pub storage: String,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let root = state.store.root();
    let storage = run_check(
        Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS),
        check_root(root),
        "unhealthy",
    )
    .await;

    let healthy = storage == "healthy";
    if !healthy {
        tracing::error!(storage = %storage, "Storage health check failed");
    }

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: VERSION,
        uptime: format!("{}s", state.started_at.elapsed().as_secs()),
        root_path: root.display().to_string(),
        last_saved: state.last_saved.get().map(|t| t.to_rfc3339()),
        converter: state.converter(),
        storage,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
