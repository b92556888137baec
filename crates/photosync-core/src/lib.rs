//! PhotoSync Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration and the
//! keyword classifier shared by every PhotoSync component.

pub mod classifier;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use classifier::{extract_command, CategoryRule, CategoryTable, Classifier};
pub use config::{
    BotConfig, ClassificationConfig, ConfigSource, LoggingConfig, NetworkConfig, PhotoSyncConfig,
    ProcessingConfig, ServerConfig, StorageConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    ClassificationResult, MediaKind, MediaObject, ReasonCode, StorageStats, StoredFile,
};
