//! Tracing subscriber setup

use std::io;
use std::path::Path;

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use photosync_core::LoggingConfig;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the console subscriber plus a size-rotated log file when one is
/// configured. `RUST_LOG` takes precedence over the configured level.
///
/// Does nothing when logging is disabled or a global subscriber is already set.
/// The returned guard flushes the file writer and must stay alive until exit.
pub fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    if !logging.enabled {
        return None;
    }

    let default_directive = format!("photosync={},tower_http=info", logging.level_directive());
    let console_fmt = tracing_subscriber::fmt::layer()
        .event_format(Format::default().compact().with_target(false));

    let (file_writer, guard, file_error) = match rotating_writer(logging) {
        Ok(Some((writer, guard))) => (Some(writer), Some(guard), None),
        Ok(None) => (None, None, None),
        Err(e) => (None, None, Some(e)),
    };
    let file_fmt = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
    });

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(console_fmt)
        .with(file_fmt)
        .try_init();

    if installed.is_err() {
        return None;
    }

    match (logging.log_file_path(), file_error) {
        (Some(path), Some(e)) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Cannot open log file, logging to stdout only"
        ),
        (Some(path), None) => tracing::debug!(
            path = %path.display(),
            max_bytes = ?logging.max_log_bytes(),
            backup_count = logging.backup_count,
            "File logging enabled"
        ),
        _ => {}
    }

    guard
}

/// Non-blocking writer over the configured log file. `Ok(None)` when no file is set.
fn rotating_writer(logging: &LoggingConfig) -> io::Result<Option<(NonBlocking, WorkerGuard)>> {
    let Some(path) = logging.log_file_path() else {
        return Ok(None);
    };
    let file = open_rotating_file(&path, logging)?;
    Ok(Some(tracing_appender::non_blocking(file)))
}

/// Rotates once the file exceeds `max_log_size_mb`, keeping `backup_count`
/// numbered backups next to it (`photosync.log.1`, `photosync.log.2`, ...).
fn open_rotating_file(path: &Path, logging: &LoggingConfig) -> io::Result<FileRotate<AppendCount>> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let limit = match logging.max_log_bytes() {
        Some(bytes) => ContentLimit::Bytes(bytes),
        None => ContentLimit::None,
    };

    Ok(FileRotate::new(
        path,
        AppendCount::new(logging.backup_count as usize),
        limit,
        Compression::None,
        #[cfg(unix)]
        None,
    ))
}
