//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Instant;

use photosync_core::PhotoSyncConfig;
use photosync_storage::{LastSavedReader, MediaStore};

use crate::services::ingest::IngestionOrchestrator;

pub struct AppState {
    pub config: PhotoSyncConfig,
    pub orchestrator: IngestionOrchestrator,
    pub store: Arc<dyn MediaStore>,
    pub last_saved: LastSavedReader,
    pub started_at: Instant,
}

impl AppState {
    /// Configured webhook secret, `None` when verification is off
    pub fn webhook_secret(&self) -> Option<&str> {
        self.config.bot.webhook_secret()
    }

    pub fn converter(&self) -> &'static str {
        self.orchestrator.normalizer().capability().health_label()
    }
}
