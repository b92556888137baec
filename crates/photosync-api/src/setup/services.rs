//! Service wiring

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use photosync_core::{Classifier, PhotoSyncConfig};
use photosync_processing::{FormatNormalizer, MediaValidator, NormalizerSettings};
use photosync_storage::{last_saved_state, LocalStorage, MediaStore};
use photosync_telegram::BotClient;

use crate::services::ingest::{
    IngestionOrchestrator, MediaFetcher, OrchestratorSettings, OutcomeNotifier,
};
use crate::state::AppState;

/// Wire the production collaborators: Telegram client, detected converter, local disk.
pub async fn initialize_services(config: PhotoSyncConfig) -> Result<Arc<AppState>> {
    let token = config
        .bot
        .token()
        .context("Telegram bot token is not configured (bot.token or TELEGRAM_BOT_TOKEN)")?;

    let client = Arc::new(
        BotClient::new(
            &config.bot.api_base,
            token,
            Duration::from_secs(config.network.download_timeout_secs.max(1)),
        )
        .context("Failed to create Telegram client")?,
    );

    let normalizer = FormatNormalizer::detect(NormalizerSettings::from(&config.processing));
    if config.processing.convert_heic && !normalizer.capability().is_available() {
        tracing::warn!("No HEIC converter available; HEIC files will be stored unconverted");
    }

    build_state(config, normalizer, client.clone(), client).await
}

/// Assemble the application state around the given collaborators.
pub async fn build_state(
    config: PhotoSyncConfig,
    normalizer: FormatNormalizer,
    fetcher: Arc<dyn MediaFetcher>,
    notifier: Arc<dyn OutcomeNotifier>,
) -> Result<Arc<AppState>> {
    let classifier =
        Classifier::from_config(&config.classification).context("Invalid category table")?;

    let (writer, _) = last_saved_state();
    let local = LocalStorage::new(config.storage.resolved_root(), writer)
        .await
        .context("Storage root is not usable")?;
    let last_saved = local.last_saved();
    let store: Arc<dyn MediaStore> = Arc::new(local);

    let orchestrator = IngestionOrchestrator::new(
        Arc::new(classifier),
        Arc::new(normalizer),
        MediaValidator::from_config(&config.storage),
        store.clone(),
        fetcher,
        notifier,
        OrchestratorSettings::from(&config),
    );

    Ok(Arc::new(AppState {
        config,
        orchestrator,
        store,
        last_saved,
        started_at: Instant::now(),
    }))
}
