use std::fmt;

use serde::{Deserialize, Serialize};

/// Precedence tier that produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    ExplicitCommand,
    CaptionMatch,
    ChatLabelMatch,
    FilenameMatch,
    NoMatch,
    Disabled,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::ExplicitCommand => "explicit_command",
            ReasonCode::CaptionMatch => "caption_match",
            ReasonCode::ChatLabelMatch => "chat_label_match",
            ReasonCode::FilenameMatch => "filename_match",
            ReasonCode::NoMatch => "no_match",
            ReasonCode::Disabled => "disabled",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    pub reason: ReasonCode,
}

impl ClassificationResult {
    pub fn new(category: impl Into<String>, reason: ReasonCode) -> Self {
        Self {
            category: category.into(),
            reason,
        }
    }
}
