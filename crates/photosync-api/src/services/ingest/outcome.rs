use std::path::Path;

use photosync_core::{AppError, ReasonCode, StoredFile};
use serde::Serialize;

/// Terminal state of one ingestion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    Saved {
        file: StoredFile,
        reason: ReasonCode,
        converted: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
    },
    Rejected {
        code: String,
        detail: String,
    },
    Failed {
        code: String,
        detail: String,
    },
    /// Nothing to ingest in this update
    Skipped { code: String },
}

impl From<AppError> for IngestOutcome {
    /// Rejections of the object become `Rejected`, everything else `Failed`.
    fn from(err: AppError) -> Self {
        let code = err.outcome_code().to_string();
        let detail = err.to_string();
        if err.is_rejection() {
            IngestOutcome::Rejected { code, detail }
        } else {
            IngestOutcome::Failed { code, detail }
        }
    }
}

impl IngestOutcome {
    pub(crate) fn skipped(code: &str) -> Self {
        IngestOutcome::Skipped {
            code: code.to_string(),
        }
    }

    /// Machine-readable reason
    pub fn code(&self) -> &str {
        match self {
            IngestOutcome::Saved { .. } => "saved",
            IngestOutcome::Rejected { code, .. }
            | IngestOutcome::Failed { code, .. }
            | IngestOutcome::Skipped { code } => code,
        }
    }

    /// Saved and skipped deliveries need no further attention
    pub fn is_success(&self) -> bool {
        matches!(self, IngestOutcome::Saved { .. } | IngestOutcome::Skipped { .. })
    }

    pub fn stored_file(&self) -> Option<&StoredFile> {
        match self {
            IngestOutcome::Saved { file, .. } => Some(file),
            _ => None,
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.stored_file().map(|f| f.absolute_path.as_path())
    }

    /// One-line human message
    pub fn summary(&self) -> String {
        match self {
            IngestOutcome::Saved { file, .. } => {
                format!("☀️ Saved → {} / {}", file.category, file.date_folder)
            }
            IngestOutcome::Rejected { detail, .. } => format!("⚠️ Not saved: {}", detail),
            IngestOutcome::Failed { detail, .. } => format!("❌ Failed: {}", detail),
            IngestOutcome::Skipped { code } => match code.as_str() {
                "command_received" => "Command received".to_string(),
                "empty_update" => "Nothing to process".to_string(),
                _ => "No media in message".to_string(),
            },
        }
    }
}
