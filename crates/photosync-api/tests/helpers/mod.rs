//! Test helpers: fake Telegram collaborators, config builders, app harness.
//!
//! Run with `cargo test -p photosync-api`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{NaiveDate, NaiveDateTime};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photosync_api::services::ingest::{
    Clock, IngestionOrchestrator, MediaFetcher, OrchestratorSettings, OutcomeNotifier,
};
use photosync_api::setup::{routes, services};
use photosync_core::{Classifier, PhotoSyncConfig};
use photosync_processing::{
    ConverterCapability, FormatNormalizer, MediaValidator, NormalizerSettings,
};
use photosync_storage::{last_saved_state, LocalStorage, MediaStore};
use tempfile::TempDir;


pub const TEST_SECRET: &str = "hook-secret";

/// Serves canned bytes per file id; unknown ids fail like a 404 from Telegram.
#[derive(Default)]
pub struct FakeFetcher {
    files: Mutex<HashMap<String, Vec<u8>>>,
    delay: Option<Duration>,
}

impl FakeFetcher {
    pub fn with_file(self, file_id: &str, data: Vec<u8>) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(file_id.to_string(), data);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| anyhow!("Bad Request: file {} not found", file_id))
    }
}

/// Records every notification; optionally fails them all.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutcomeNotifier for RecordingNotifier {
    async fn notify(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        if self.fail {
            return Err(anyhow!("Forbidden: bot was kicked from the group chat"));
        }
        Ok(())
    }
}

pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// 2024-06-01 09:30:00
pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// Default configuration with storage rooted in `root`.
pub fn test_config(root: &TempDir) -> PhotoSyncConfig {
    let mut config = PhotoSyncConfig::default();
    config.storage.root_path = root.path().to_path_buf();
    config.bot.token = "123456:TEST".to_string();
    config.network.download_timeout_secs = 5;
    config.processing.conversion_timeout_secs = 10;
    config
}

pub fn sample_png() -> Vec<u8> {
    let img = RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 90]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

pub struct Harness {
    pub orchestrator: IngestionOrchestrator,
    pub fetcher: Arc<FakeFetcher>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<dyn MediaStore>,
    pub root: TempDir,
}

/// Orchestrator over local storage in a temp dir with the clock pinned to `fixed_time()`.
pub async fn harness_with(
    configure: impl FnOnce(&mut PhotoSyncConfig),
    capability: ConverterCapability,
    fetcher: FakeFetcher,
    notifier: RecordingNotifier,
) -> Harness {
    harness_with_settings(configure, |_| {}, capability, fetcher, notifier).await
}

/// Like `harness_with`, with sub-second timeouts reachable through `adjust`.
pub async fn harness_with_settings(
    configure: impl FnOnce(&mut PhotoSyncConfig),
    adjust: impl FnOnce(&mut OrchestratorSettings),
    capability: ConverterCapability,
    fetcher: FakeFetcher,
    notifier: RecordingNotifier,
) -> Harness {
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(&root);
    configure(&mut config);

    let (writer, _) = last_saved_state();
    let store: Arc<dyn MediaStore> =
        Arc::new(LocalStorage::new(root.path(), writer).await.unwrap());
    let fetcher = Arc::new(fetcher);
    let notifier = Arc::new(notifier);

    let mut settings = OrchestratorSettings::from(&config);
    adjust(&mut settings);

    let orchestrator = IngestionOrchestrator::new(
        Arc::new(Classifier::from_config(&config.classification).unwrap()),
        Arc::new(FormatNormalizer::new(
            NormalizerSettings::from(&config.processing),
            capability,
        )),
        MediaValidator::from_config(&config.storage),
        store.clone(),
        fetcher.clone(),
        notifier.clone(),
        settings,
    )
    .with_clock(Arc::new(FixedClock(fixed_time())));

    Harness {
        orchestrator,
        fetcher,
        notifier,
        store,
        root,
    }
}

pub async fn harness(fetcher: FakeFetcher) -> Harness {
    harness_with(
        |_| {},
        ConverterCapability::None,
        fetcher,
        RecordingNotifier::default(),
    )
    .await
}

/// HTTP server over the real router with fake Telegram collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub notifier: Arc<RecordingNotifier>,
    pub root: TempDir,
}

pub async fn setup_test_app(secret: Option<&str>, fetcher: FakeFetcher) -> TestApp {
    setup_test_app_with(secret, fetcher, ConverterCapability::None).await
}

pub async fn setup_test_app_with(
    secret: Option<&str>,
    fetcher: FakeFetcher,
    capability: ConverterCapability,
) -> TestApp {
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(&root);
    if let Some(secret) = secret {
        config.bot.webhook_secret = secret.to_string();
    }

    let notifier = Arc::new(RecordingNotifier::default());
    let normalizer = FormatNormalizer::new(
        NormalizerSettings::from(&config.processing),
        capability,
    );
    let state = services::build_state(config, normalizer, Arc::new(fetcher), notifier.clone())
        .await
        .unwrap();

    let server = TestServer::new(routes::setup_routes(state)).expect("Failed to create test server");
    TestApp {
        server,
        notifier,
        root,
    }
}

/// API path under the service prefix
pub fn api_path(path: &str) -> String {
    format!("{}{}", photosync_api::constants::API_PREFIX, path)
}

pub const CHAT_ID: i64 = -100123;

/// Update carrying one document attachment.
pub fn document_update(
    file_id: &str,
    file_name: &str,
    caption: Option<&str>,
    file_size: Option<u64>,
) -> photosync_telegram::Update {
    let mut document = serde_json::json!({ "file_id": file_id, "file_name": file_name });
    if let Some(size) = file_size {
        document["file_size"] = serde_json::json!(size);
    }
    let mut message = serde_json::json!({
        "message_id": 1,
        "chat": { "id": CHAT_ID, "type": "group" },
        "document": document,
    });
    if let Some(caption) = caption {
        message["caption"] = serde_json::json!(caption);
    }
    serde_json::from_value(serde_json::json!({ "update_id": 1, "message": message })).unwrap()
}
