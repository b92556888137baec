//! Error types module
//!
//! `AppError` is the taxonomy every terminal failure of the ingestion pipeline is
//! mapped onto. Lower crates keep their own typed errors and convert into it at the
//! orchestrator boundary.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like rejected media
    Debug,
    /// Warning level - for recoverable issues like a failed download
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_FAILURE")
    fn error_code(&self) -> &'static str;

    /// Whether a later delivery of the same object may succeed
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported media kind: {0}")]
    UnsupportedMediaKind(String),

    #[error("Unsupported file extension: {extension}")]
    UnsupportedExtension { extension: String },

    #[error("File too large: {size} bytes exceeds limit of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Download failed: {0}")]
    DownloadFailure(String),

    #[error("Conversion failed: {0}")]
    ConversionFailure(String),

    #[error("Storage error: {0}")]
    StorageFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::StorageFailure(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl AppError {
    /// Reason code carried by a rejected or failed ingestion outcome
    pub fn outcome_code(&self) -> &'static str {
        match self {
            AppError::UnsupportedMediaKind(_) => "unsupported_media_kind",
            AppError::UnsupportedExtension { .. } => "unsupported_extension",
            AppError::FileTooLarge { .. } => "file_too_large",
            AppError::DownloadFailure(_) => "download_failed",
            AppError::ConversionFailure(_) => "conversion_failed",
            AppError::StorageFailure(_) => "storage_failed",
            AppError::Configuration(_) => "configuration_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Refusals of the object itself, decided before anything is stored
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AppError::UnsupportedMediaKind(_)
                | AppError::UnsupportedExtension { .. }
                | AppError::FileTooLarge { .. }
        )
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::UnsupportedMediaKind(_) => {
            (415, "UNSUPPORTED_MEDIA_KIND", false, LogLevel::Debug)
        }
        AppError::UnsupportedExtension { .. } => {
            (415, "UNSUPPORTED_EXTENSION", false, LogLevel::Debug)
        }
        AppError::FileTooLarge { .. } => (413, "FILE_TOO_LARGE", false, LogLevel::Debug),
        AppError::DownloadFailure(_) => (502, "DOWNLOAD_FAILURE", true, LogLevel::Warn),
        AppError::ConversionFailure(_) => (500, "CONVERSION_FAILURE", false, LogLevel::Warn),
        AppError::StorageFailure(_) => (500, "STORAGE_FAILURE", true, LogLevel::Error),
        AppError::Configuration(_) => (500, "CONFIGURATION_ERROR", false, LogLevel::Error),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            // Storage and internal details may carry local paths
            AppError::StorageFailure(_) => "Failed to store file".to_string(),
            AppError::Configuration(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            AppError::Unauthorized(_) => "Unauthorized".to_string(),
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}
