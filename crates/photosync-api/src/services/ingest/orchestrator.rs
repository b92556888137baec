use std::sync::Arc;
use std::time::{Duration, Instant};

use photosync_core::config::PhotoSyncConfig;
use photosync_core::{AppError, Classifier, ErrorMetadata, LogLevel, MediaObject};
use photosync_processing::{FormatNormalizer, MediaValidator};
use photosync_storage::MediaStore;
use photosync_telegram::Update;

use super::collaborators::{Clock, MediaFetcher, OutcomeNotifier, SystemClock};
use super::extract::extract_media;
use super::outcome::IngestOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub download_timeout: Duration,
    pub conversion_timeout: Duration,
    /// Confirm saved files to the chat
    pub notify: bool,
    /// Also report rejections and failures
    pub notify_failures: bool,
}

impl From<&PhotoSyncConfig> for OrchestratorSettings {
    fn from(config: &PhotoSyncConfig) -> Self {
        Self {
            download_timeout: Duration::from_secs(config.network.download_timeout_secs.max(1)),
            conversion_timeout: Duration::from_secs(
                config.processing.conversion_timeout_secs.max(1),
            ),
            notify: config.bot.notify,
            notify_failures: config.bot.notify_failures,
        }
    }
}

/// Drives one media object from receipt to a terminal outcome:
/// validate, fetch, classify, normalize, store, notify.
pub struct IngestionOrchestrator {
    classifier: Arc<Classifier>,
    normalizer: Arc<FormatNormalizer>,
    validator: MediaValidator,
    store: Arc<dyn MediaStore>,
    fetcher: Arc<dyn MediaFetcher>,
    notifier: Arc<dyn OutcomeNotifier>,
    settings: OrchestratorSettings,
    clock: Arc<dyn Clock>,
}

impl IngestionOrchestrator {
    pub fn new(
        classifier: Arc<Classifier>,
        normalizer: Arc<FormatNormalizer>,
        validator: MediaValidator,
        store: Arc<dyn MediaStore>,
        fetcher: Arc<dyn MediaFetcher>,
        notifier: Arc<dyn OutcomeNotifier>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            classifier,
            normalizer,
            validator,
            store,
            fetcher,
            notifier,
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn normalizer(&self) -> &FormatNormalizer {
        &self.normalizer
    }

    /// Handle one webhook delivery.
    pub async fn handle_update(&self, update: &Update) -> IngestOutcome {
        let Some(message) = update.message.as_ref() else {
            tracing::debug!(update_id = update.update_id, "Update without message");
            return IngestOutcome::skipped("empty_update");
        };

        tracing::info!(
            update_id = update.update_id,
            chat_id = message.chat.id,
            "Webhook update received"
        );

        match extract_media(message, self.clock.now()) {
            Some(media) => self.ingest(media).await,
            None => {
                let is_command = message
                    .text
                    .as_deref()
                    .is_some_and(|t| t.trim_start().starts_with('/'));
                if is_command {
                    IngestOutcome::skipped("command_received")
                } else {
                    IngestOutcome::skipped("no_media")
                }
            }
        }
    }

    /// Run the ingestion state machine for one media object.
    pub async fn ingest(&self, media: MediaObject) -> IngestOutcome {
        let chat_id = media.chat_id;
        let outcome = self.process(media).await;
        self.notify(chat_id, &outcome).await;
        outcome
    }

    async fn process(&self, media: MediaObject) -> IngestOutcome {
        let received_at = self.clock.now();
        let start = Instant::now();

        tracing::info!(
            kind = %media.kind,
            file_name = %media.original_name,
            size_bytes = ?media.size_bytes,
            "Media received"
        );

        if let Err(e) = self.validator.validate(&media) {
            return terminal(&media.original_name, AppError::from(e));
        }

        let data = match tokio::time::timeout(
            self.settings.download_timeout,
            self.fetcher.fetch(&media.file_id),
        )
        .await
        {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => {
                return terminal(&media.original_name, AppError::DownloadFailure(format!("{:#}", e)));
            }
            Err(_) => {
                let err = AppError::DownloadFailure(format!(
                    "timed out after {}s",
                    self.settings.download_timeout.as_secs_f64()
                ));
                return terminal(&media.original_name, err);
            }
        };

        // Telegram does not always report a size up front
        if let Err(e) = self.validator.validate_size(Some(data.len() as u64)) {
            return terminal(&media.original_name, AppError::from(e));
        }

        let classification = self.classifier.classify(
            &media.original_name,
            media.caption.as_deref(),
            media.chat_label.as_deref(),
            media.explicit_command.as_deref(),
        );
        tracing::info!(
            file_name = %media.original_name,
            category = %classification.category,
            reason = %classification.reason,
            "Media classified"
        );

        let (data, name, converted, tool) = self.normalize(data, &media.original_name).await;

        match self
            .store
            .save(data, &classification.category, &name, received_at)
            .await
        {
            Ok(file) => {
                tracing::info!(
                    path = %file.absolute_path.display(),
                    category = %file.category,
                    reason = %classification.reason,
                    converted,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Media saved"
                );
                IngestOutcome::Saved {
                    file,
                    reason: classification.reason,
                    converted,
                    tool,
                }
            }
            Err(e) => terminal(&name, AppError::from(e)),
        }
    }

    /// Convert legacy images when possible. Any failure keeps the original
    /// bytes and name.
    async fn normalize(
        &self,
        data: Vec<u8>,
        name: &str,
    ) -> (Vec<u8>, String, bool, Option<String>) {
        if !FormatNormalizer::is_legacy_image(name) {
            return (data, name.to_string(), false, None);
        }

        let settings = self.normalizer.settings();
        let attempt = tokio::time::timeout(
            self.settings.conversion_timeout,
            self.normalizer
                .convert(&data, settings.quality, settings.preserve_metadata),
        )
        .await;

        match attempt {
            Ok(outcome) if outcome.converted => match outcome.output {
                Some(output) => {
                    tracing::info!(
                        file_name = %name,
                        tool = ?outcome.tool_used,
                        capture_date = ?outcome.metadata.capture_date,
                        orientation = ?outcome.metadata.orientation,
                        "Legacy image normalized"
                    );
                    (
                        output,
                        FormatNormalizer::converted_name(name),
                        true,
                        outcome.tool_used,
                    )
                }
                None => (data, name.to_string(), false, None),
            },
            Ok(outcome) => {
                let reason = outcome
                    .failure_reason
                    .unwrap_or_else(|| "no converter produced output".to_string());
                log_error(name, &AppError::ConversionFailure(reason), "Storing original");
                (data, name.to_string(), false, None)
            }
            Err(_) => {
                let err = AppError::ConversionFailure(format!(
                    "timed out after {}s",
                    self.settings.conversion_timeout.as_secs_f64()
                ));
                log_error(name, &err, "Storing original");
                (data, name.to_string(), false, None)
            }
        }
    }

    /// Best-effort chat notification; failures are only logged.
    async fn notify(&self, chat_id: i64, outcome: &IngestOutcome) {
        let wanted = match outcome {
            IngestOutcome::Saved { .. } => self.settings.notify,
            IngestOutcome::Rejected { .. } | IngestOutcome::Failed { .. } => {
                self.settings.notify_failures
            }
            IngestOutcome::Skipped { .. } => false,
        };
        if !wanted {
            return;
        }

        if let Err(e) = self.notifier.notify(chat_id, &outcome.summary()).await {
            tracing::warn!(chat_id, error = %e, "Failed to send notification");
        }
    }
}

/// Log a terminal error and turn it into the outcome reported to the chat.
fn terminal(file_name: &str, err: AppError) -> IngestOutcome {
    let message = if err.is_rejection() { "Media rejected" } else { "Ingestion failed" };
    log_error(file_name, &err, message);
    IngestOutcome::from(err)
}

// Rejections are routine and stay visible at the default level
fn log_error(file_name: &str, err: &AppError, message: &str) {
    let code = err.outcome_code();
    match err.log_level() {
        _ if err.is_rejection() => tracing::info!(file_name, code, error = %err, "{}", message),
        LogLevel::Debug => tracing::debug!(file_name, code, error = %err, "{}", message),
        LogLevel::Warn => tracing::warn!(file_name, code, error = %err, "{}", message),
        LogLevel::Error => tracing::error!(file_name, code, error = %err, "{}", message),
    }
}
