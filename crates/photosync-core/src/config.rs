//! Configuration module
//!
//! PhotoSync reads a single JSON document with one section per concern. Every
//! field has a default, so a missing file or a partial file both produce a usable
//! configuration. A handful of environment variables override the file so that
//! secrets can stay out of it.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CATEGORY, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_TELEGRAM_API_BASE,
};
use crate::error::AppError;
use crate::models::MediaKind;

pub const DEFAULT_CONFIG_PATH: &str = "config/photosync.config.json";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONVERSION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoSyncConfig {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub processing: ProcessingConfig,
    pub classification: ClassificationConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub token: String,
    pub webhook_url: String,
    pub webhook_secret: String,
    pub api_base: String,
    /// Confirm saved files back to the chat
    pub notify: bool,
    /// Also report rejections and failures to the chat
    pub notify_failures: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            webhook_url: String::new(),
            webhook_secret: String::new(),
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            notify: true,
            notify_failures: false,
        }
    }
}

impl BotConfig {
    pub fn token(&self) -> Option<&str> {
        non_empty(&self.token)
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        non_empty(&self.webhook_secret)
    }

    pub fn webhook_url(&self) -> Option<&str> {
        non_empty(&self.webhook_url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root_path: PathBuf,
    pub allowed_types: Vec<MediaKind>,
    /// Empty list allows every extension
    pub allowed_extensions: Vec<String>,
    /// 0 disables the limit
    pub max_file_size_mb: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("~/SOLAR/PhotoSync"),
            allowed_types: MediaKind::ALL.to_vec(),
            allowed_extensions: Vec::new(),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
        }
    }
}

impl StorageConfig {
    /// Root path with a leading `~` expanded against `$HOME`.
    pub fn resolved_root(&self) -> PathBuf {
        expand_home(&self.root_path)
    }

    pub fn max_file_size_bytes(&self) -> Option<u64> {
        match self.max_file_size_mb {
            0 => None,
            mb => Some(mb.saturating_mul(1024 * 1024)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub convert_heic: bool,
    pub heic_quality: u8,
    pub preserve_exif: bool,
    pub conversion_timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            convert_heic: true,
            heic_quality: DEFAULT_JPEG_QUALITY,
            preserve_exif: true,
            conversion_timeout_secs: DEFAULT_CONVERSION_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub auto_classification: bool,
    pub default_category: String,
    /// Category name to keywords, evaluated in file order
    pub categories: IndexMap<String, Vec<String>>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        let mut categories = IndexMap::new();
        categories.insert("Sprinter".to_string(), vec!["sprinter".to_string()]);
        categories.insert(
            "LDZ".to_string(),
            vec!["ldz".to_string(), "vagon".to_string()],
        );
        categories.insert(
            "Legal".to_string(),
            vec!["court".to_string(), "суд".to_string()],
        );
        categories.insert(
            "Documents".to_string(),
            vec!["document".to_string(), "паспорт".to_string()],
        );
        Self {
            auto_classification: true,
            default_category: DEFAULT_CATEGORY.to_string(),
            categories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub log_level: String,
    pub log_path: PathBuf,
    pub log_file: String,
    pub max_log_size_mb: u64,
    pub backup_count: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "INFO".to_string(),
            log_path: PathBuf::from("~/SOLAR/PhotoSync/logs"),
            log_file: "photosync.log".to_string(),
            max_log_size_mb: 10,
            backup_count: 5,
        }
    }
}

impl LoggingConfig {
    /// Full path of the log file with `~` expanded. `None` when no file name is set.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        let file = self.log_file.trim();
        if file.is_empty() {
            return None;
        }
        Some(expand_home(&self.log_path).join(file))
    }

    /// Rotation threshold in bytes, `None` for an unbounded file.
    pub fn max_log_bytes(&self) -> Option<usize> {
        match self.max_log_size_mb {
            0 => None,
            mb => Some(mb.saturating_mul(1024 * 1024) as usize),
        }
    }

    /// Level as an `EnvFilter` directive (`info`, `debug`, ...).
    pub fn level_directive(&self) -> String {
        match self.log_level.trim().to_lowercase().as_str() {
            "warning" => "warn".to_string(),
            "critical" | "fatal" => "error".to_string(),
            "" => "info".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub download_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file at this path; built-in defaults were used
    Defaults(PathBuf),
}

impl PhotoSyncConfig {
    /// Load configuration from `path`, `$PHOTOSYNC_CONFIG` or the default location,
    /// apply environment overrides and validate.
    ///
    /// A missing file is not an error; the built-in defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let (config, source) = Self::load_with_source(path)?;
        if let ConfigSource::Defaults(path) = &source {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using built-in defaults"
            );
        }
        Ok(config)
    }

    /// Same as [`load`](Self::load) without logging, so callers can report the
    /// source once a subscriber is installed.
    pub fn load_with_source(path: Option<&Path>) -> Result<(Self, ConfigSource), AppError> {
        dotenvy::dotenv().ok();

        let path = match path {
            Some(p) => p.to_path_buf(),
            None => env::var("PHOTOSYNC_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        let (mut config, source) = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                AppError::Configuration(format!("Cannot read {}: {}", path.display(), e))
            })?;
            (Self::from_json_str(&raw)?, ConfigSource::File(path))
        } else {
            (Self::default(), ConfigSource::Defaults(path))
        };

        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok((config, source))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::Configuration(format!("Invalid config file: {}", e)))
    }

    /// Apply `TELEGRAM_BOT_TOKEN`, `PHOTOSYNC_WEBHOOK_SECRET`, `PHOTOSYNC_ROOT_PATH`
    /// and `PORT` from `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.bot.token = token;
        }
        if let Some(secret) = get("PHOTOSYNC_WEBHOOK_SECRET") {
            self.bot.webhook_secret = secret;
        }
        if let Some(root) = get("PHOTOSYNC_ROOT_PATH") {
            self.storage.root_path = PathBuf::from(root);
        }
        if let Some(port) = get("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT override"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.processing.heic_quality > 100 {
            return Err(AppError::Configuration(format!(
                "processing.heic_quality must be between 0 and 100, got {}",
                self.processing.heic_quality
            )));
        }

        if self.storage.root_path.as_os_str().is_empty() {
            return Err(AppError::Configuration(
                "storage.root_path must not be empty".to_string(),
            ));
        }

        validate_path_component(&self.classification.default_category).map_err(|e| {
            AppError::Configuration(format!("classification.default_category: {}", e))
        })?;

        let mut seen = HashSet::new();
        for (name, keywords) in &self.classification.categories {
            validate_path_component(name)
                .map_err(|e| AppError::Configuration(format!("category {:?}: {}", name, e)))?;
            if !seen.insert(name.to_lowercase()) {
                return Err(AppError::Configuration(format!(
                    "category {:?} is defined more than once",
                    name
                )));
            }
            if keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(AppError::Configuration(format!(
                    "category {:?} has an empty keyword",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Check that `name` can be used as a single directory name under the storage root.
pub fn validate_path_component(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name != name.trim() {
        return Err("name must not have surrounding whitespace".to_string());
    }
    if name.starts_with('.') {
        return Err("name must not start with a dot".to_string());
    }
    if name
        .chars()
        .any(|c| matches!(c, '/' | '\\' | ':' | '<' | '>' | '"' | '|' | '?' | '*') || c.is_control())
    {
        return Err("name contains characters not allowed in a directory name".to_string());
    }
    Ok(())
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
