use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use photosync_core::constants::VERSION;
use photosync_core::StorageStats;
use serde::Serialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: StorageStats,
    pub version: &'static str,
}

/// Counts of stored files per category and date folder
pub async fn storage_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let stats = state.store.stats().await?;
    Ok(Json(StatsResponse {
        stats,
        version: VERSION,
    }))
}
