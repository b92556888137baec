//! Storage abstraction trait

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use photosync_core::{AppError, StorageStats, StoredFile};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigError(msg) => AppError::Configuration(msg),
            other => AppError::StorageFailure(other.to_string()),
        }
    }
}

/// Destination for ingested media
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Write `data` under the date folder of `timestamp` and the `category`
    /// directory. Returns the file actually created.
    async fn save(
        &self,
        data: Vec<u8>,
        category: &str,
        original_name: &str,
        timestamp: NaiveDateTime,
    ) -> StorageResult<StoredFile>;

    /// Walk the tree and aggregate counts
    async fn stats(&self) -> StorageResult<StorageStats>;

    fn root(&self) -> &Path;
}
