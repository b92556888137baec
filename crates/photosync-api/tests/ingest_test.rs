//! End-to-end ingestion through the orchestrator with fake Telegram collaborators.

mod helpers;

use std::time::Duration;

use helpers::*;
use indexmap::IndexMap;
use photosync_api::IngestOutcome;
use photosync_core::{MediaKind, ReasonCode};
use photosync_processing::ConverterCapability;

fn saved(outcome: &IngestOutcome) -> (&photosync_core::StoredFile, ReasonCode, bool) {
    match outcome {
        IngestOutcome::Saved {
            file,
            reason,
            converted,
            ..
        } => (file, *reason, *converted),
        other => panic!("expected saved outcome, got {:?}", other),
    }
}

fn files_under(root: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                found.push(path);
            }
        }
    }
    found
}

#[tokio::test]
async fn test_caption_match_with_heic_conversion() {
    let h = harness_with(
        |config| {
            let mut categories = IndexMap::new();
            categories.insert("Sprinter".to_string(), vec!["sprinter".to_string()]);
            config.classification.categories = categories;
        },
        ConverterCapability::Embedded,
        FakeFetcher::default().with_file("f1", sample_png()),
        RecordingNotifier::default(),
    )
    .await;

    let update = document_update("f1", "img001.heic", Some("sprinter load #4"), None);
    let outcome = h.orchestrator.handle_update(&update).await;

    let (file, reason, converted) = saved(&outcome);
    assert_eq!(reason, ReasonCode::CaptionMatch);
    assert!(converted);
    assert_eq!(file.category, "Sprinter");
    assert_eq!(file.date_folder, "2024-06-01");
    assert_eq!(file.final_name, "20240601_093000_img001.jpg");
    assert_eq!(
        file.absolute_path,
        h.root
            .path()
            .join("2024-06-01")
            .join("Sprinter")
            .join("20240601_093000_img001.jpg")
    );

    let bytes = std::fs::read(&file.absolute_path).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_cyrillic_keyword_in_filename() {
    let h = harness(FakeFetcher::default().with_file("f2", b"%PDF-1.4".to_vec())).await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("f2", "suд_protocol.pdf", None, Some(8)))
        .await;

    let (file, reason, _) = saved(&outcome);
    assert_eq!(file.category, "Legal");
    assert_eq!(reason, ReasonCode::FilenameMatch);
}

#[tokio::test]
async fn test_explicit_command_beats_keywords() {
    let h = harness(FakeFetcher::default().with_file("f3", b"report".to_vec())).await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update(
            "f3",
            "sprinter_report.pdf",
            Some("/documents"),
            None,
        ))
        .await;

    let (file, reason, _) = saved(&outcome);
    assert_eq!(file.category, "Documents");
    assert_eq!(reason, ReasonCode::ExplicitCommand);
}

#[tokio::test]
async fn test_classification_disabled_uses_default() {
    let h = harness_with(
        |config| config.classification.auto_classification = false,
        ConverterCapability::None,
        FakeFetcher::default().with_file("f4", b"data".to_vec()),
        RecordingNotifier::default(),
    )
    .await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("f4", "sprinter.pdf", Some("/legal court"), None))
        .await;

    let (file, reason, _) = saved(&outcome);
    assert_eq!(file.category, "Other");
    assert_eq!(reason, ReasonCode::Disabled);
}

#[tokio::test]
async fn test_no_converter_stores_original() {
    let original = b"ftypheic not decodable".to_vec();
    let h = harness(FakeFetcher::default().with_file("f5", original.clone())).await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("f5", "img002.heic", None, None))
        .await;

    let (file, _, converted) = saved(&outcome);
    assert!(!converted);
    assert_eq!(file.final_name, "20240601_093000_img002.heic");
    assert_eq!(std::fs::read(&file.absolute_path).unwrap(), original);
}

#[tokio::test]
async fn test_failed_conversion_stores_original() {
    let original = b"ftypheic not decodable".to_vec();
    let h = harness_with(
        |_| {},
        ConverterCapability::Embedded,
        FakeFetcher::default().with_file("f6", original.clone()),
        RecordingNotifier::default(),
    )
    .await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("f6", "IMG_7.HEIC", None, None))
        .await;

    let (file, _, converted) = saved(&outcome);
    assert!(!converted);
    assert_eq!(file.final_name, "20240601_093000_IMG_7.heic");
    assert_eq!(std::fs::read(&file.absolute_path).unwrap(), original);
}

#[cfg(unix)]
#[tokio::test]
async fn test_conversion_timeout_stores_original_and_kills_tool() {
    use std::os::unix::fs::PermissionsExt;

    let bin = tempfile::tempdir().unwrap();
    let marker = bin.path().join("finished");
    let program = bin.path().join("magick");
    std::fs::write(
        &program,
        format!("#!/bin/sh\nsleep 1\ntouch '{}'\n", marker.display()),
    )
    .unwrap();
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

    let original = b"ftypheic slow to convert".to_vec();
    let h = harness_with_settings(
        |_| {},
        |settings| settings.conversion_timeout = Duration::from_millis(100),
        ConverterCapability::ImageMagick { program },
        FakeFetcher::default().with_file("f12", original.clone()),
        RecordingNotifier::default(),
    )
    .await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("f12", "img003.heic", None, None))
        .await;

    let (file, _, converted) = saved(&outcome);
    assert!(!converted);
    assert_eq!(file.final_name, "20240601_093000_img003.heic");
    assert_eq!(std::fs::read(&file.absolute_path).unwrap(), original);
    assert!(matches!(&outcome, IngestOutcome::Saved { tool: None, .. }));

    // A tool left running would have finished its sleep by now
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_same_name_twice_gets_suffix() {
    let h = harness(FakeFetcher::default().with_file("f7", b"one".to_vec())).await;
    let update = document_update("f7", "scan.pdf", None, None);

    let first = h.orchestrator.handle_update(&update).await;
    let second = h.orchestrator.handle_update(&update).await;

    assert_eq!(saved(&first).0.final_name, "20240601_093000_scan.pdf");
    assert_eq!(saved(&second).0.final_name, "20240601_093000_scan_1.pdf");
}

#[tokio::test]
async fn test_disallowed_kind_is_rejected() {
    let h = harness_with(
        |config| config.storage.allowed_types = vec![MediaKind::Photo],
        ConverterCapability::None,
        FakeFetcher::default().with_file("f8", b"doc".to_vec()),
        RecordingNotifier::default(),
    )
    .await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("f8", "a.pdf", None, None))
        .await;

    assert!(matches!(outcome, IngestOutcome::Rejected { .. }));
    assert_eq!(outcome.code(), "unsupported_media_kind");
    assert!(files_under(h.root.path()).is_empty());
}

#[tokio::test]
async fn test_disallowed_extension_is_rejected() {
    let h = harness_with(
        |config| config.storage.allowed_extensions = vec![".jpg".to_string()],
        ConverterCapability::None,
        FakeFetcher::default().with_file("f9", b"doc".to_vec()),
        RecordingNotifier::default(),
    )
    .await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("f9", "a.pdf", None, None))
        .await;

    assert_eq!(outcome.code(), "unsupported_extension");
}

#[tokio::test]
async fn test_reported_size_over_limit_is_rejected_before_download() {
    let h = harness_with(
        |config| config.storage.max_file_size_mb = 1,
        ConverterCapability::None,
        FakeFetcher::default(),
        RecordingNotifier::default(),
    )
    .await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("big", "big.zip", None, Some(5 * 1024 * 1024)))
        .await;

    assert!(matches!(outcome, IngestOutcome::Rejected { .. }));
    assert_eq!(outcome.code(), "file_too_large");
}

#[tokio::test]
async fn test_downloaded_size_over_limit_is_rejected() {
    let h = harness_with(
        |config| config.storage.max_file_size_mb = 1,
        ConverterCapability::None,
        FakeFetcher::default().with_file("big", vec![0u8; 2 * 1024 * 1024]),
        RecordingNotifier::default(),
    )
    .await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("big", "big.bin", None, None))
        .await;

    assert_eq!(outcome.code(), "file_too_large");
    assert!(files_under(h.root.path()).is_empty());
}

#[tokio::test]
async fn test_download_failure_leaves_nothing_behind() {
    let h = harness(FakeFetcher::default()).await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("missing", "a.pdf", None, None))
        .await;

    assert!(matches!(outcome, IngestOutcome::Failed { .. }));
    assert_eq!(outcome.code(), "download_failed");
    assert!(files_under(h.root.path()).is_empty());
}

#[tokio::test]
async fn test_download_timeout_is_a_failure() {
    let h = harness_with(
        |config| config.network.download_timeout_secs = 1,
        ConverterCapability::None,
        FakeFetcher::default()
            .with_file("slow", b"late".to_vec())
            .with_delay(Duration::from_secs(3)),
        RecordingNotifier::default(),
    )
    .await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("slow", "a.pdf", None, None))
        .await;

    assert_eq!(outcome.code(), "download_failed");
}

#[tokio::test]
async fn test_updates_without_media_are_skipped() {
    let h = harness(FakeFetcher::default()).await;

    let empty: photosync_telegram::Update =
        serde_json::from_value(serde_json::json!({ "update_id": 5 })).unwrap();
    assert_eq!(h.orchestrator.handle_update(&empty).await.code(), "empty_update");

    let command: photosync_telegram::Update = serde_json::from_value(serde_json::json!({
        "update_id": 6,
        "message": { "message_id": 2, "chat": { "id": 1 }, "text": "/start" }
    }))
    .unwrap();
    assert_eq!(
        h.orchestrator.handle_update(&command).await.code(),
        "command_received"
    );

    let chatter: photosync_telegram::Update = serde_json::from_value(serde_json::json!({
        "update_id": 7,
        "message": { "message_id": 3, "chat": { "id": 1 }, "text": "hello" }
    }))
    .unwrap();
    assert_eq!(h.orchestrator.handle_update(&chatter).await.code(), "no_media");
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_saved_outcome_is_notified() {
    let h = harness(FakeFetcher::default().with_file("n1", b"x".to_vec())).await;

    h.orchestrator
        .handle_update(&document_update("n1", "court_order.pdf", None, None))
        .await;

    assert_eq!(
        h.notifier.messages(),
        vec![(CHAT_ID, "☀️ Saved → Legal / 2024-06-01".to_string())]
    );
}

#[tokio::test]
async fn test_failures_notified_only_when_enabled() {
    let quiet = harness(FakeFetcher::default()).await;
    quiet
        .orchestrator
        .handle_update(&document_update("missing", "a.pdf", None, None))
        .await;
    assert!(quiet.notifier.messages().is_empty());

    let loud = harness_with(
        |config| config.bot.notify_failures = true,
        ConverterCapability::None,
        FakeFetcher::default(),
        RecordingNotifier::default(),
    )
    .await;
    loud.orchestrator
        .handle_update(&document_update("missing", "a.pdf", None, None))
        .await;

    let messages = loud.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.starts_with("❌ Failed"));
}

#[tokio::test]
async fn test_notification_failure_does_not_change_outcome() {
    let h = harness_with(
        |_| {},
        ConverterCapability::None,
        FakeFetcher::default().with_file("n2", b"x".to_vec()),
        RecordingNotifier::failing(),
    )
    .await;

    let outcome = h
        .orchestrator
        .handle_update(&document_update("n2", "a.pdf", None, None))
        .await;

    assert!(outcome.is_success());
    assert_eq!(h.notifier.messages().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deliveries_get_distinct_names() {
    let h = harness(FakeFetcher::default().with_file("c", b"same".to_vec())).await;
    let update = document_update("c", "burst.jpg", None, None);

    let deliveries = (0..8).map(|_| h.orchestrator.handle_update(&update));
    let outcomes = futures::future::join_all(deliveries).await;

    let mut names: Vec<_> = outcomes
        .iter()
        .map(|o| saved(o).0.final_name.clone())
        .collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 8);
    assert_eq!(files_under(h.root.path()).len(), 8);
}
