use photosync_core::config::StorageConfig;
use photosync_core::{AppError, MediaKind, MediaObject};

/// Reasons a media object is refused before it is downloaded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported media kind: {kind}")]
    UnsupportedKind { kind: MediaKind },

    #[error("Invalid file extension: {extension:?} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedKind { kind } => {
                AppError::UnsupportedMediaKind(kind.to_string())
            }
            ValidationError::InvalidExtension { extension, .. } => {
                AppError::UnsupportedExtension { extension }
            }
            ValidationError::FileTooLarge { size, max } => AppError::FileTooLarge { size, max },
        }
    }
}

/// Media object validator
///
/// Applies the configured allow-lists to an object before any bytes are fetched.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    allowed_kinds: Vec<MediaKind>,
    /// Lowercase, without leading dot. Empty allows everything.
    allowed_extensions: Vec<String>,
    max_file_size: Option<u64>,
}

impl MediaValidator {
    pub fn new(
        allowed_kinds: Vec<MediaKind>,
        allowed_extensions: Vec<String>,
        max_file_size: Option<u64>,
    ) -> Self {
        let allowed_extensions = allowed_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            allowed_kinds,
            allowed_extensions,
            max_file_size,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.allowed_types.clone(),
            config.allowed_extensions.clone(),
            config.max_file_size_bytes(),
        )
    }

    pub fn validate_kind(&self, kind: MediaKind) -> Result<(), ValidationError> {
        if !self.allowed_kinds.contains(&kind) {
            return Err(ValidationError::UnsupportedKind { kind });
        }
        Ok(())
    }

    /// Validate file extension. Names without an extension only pass an empty allow-list.
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        if self.allowed_extensions.is_empty() {
            return Ok(());
        }

        let extension = extension_of(filename);
        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Validate a reported size. Unknown sizes pass.
    pub fn validate_size(&self, size: Option<u64>) -> Result<(), ValidationError> {
        match (size, self.max_file_size) {
            (Some(size), Some(max)) if size > max => Err(ValidationError::FileTooLarge { size, max }),
            _ => Ok(()),
        }
    }

    pub fn validate(&self, media: &MediaObject) -> Result<(), ValidationError> {
        self.validate_kind(media.kind)?;
        self.validate_extension(&media.original_name)?;
        self.validate_size(media.size_bytes)?;
        Ok(())
    }
}

fn extension_of(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename[idx + 1..].to_lowercase(),
        _ => String::new(),
    }
}
