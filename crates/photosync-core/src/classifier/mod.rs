//! Keyword classifier.
//!
//! `classify` is total: it always returns a category from the table or the
//! default. Signals are tried in a fixed order and the first hit wins:
//! explicit command, caption, chat label, file name.

mod fold;
mod table;

use std::sync::OnceLock;

use regex::Regex;

pub use table::{CategoryRule, CategoryTable};

use crate::config::ClassificationConfig;
use crate::error::AppError;
use crate::models::{ClassificationResult, ReasonCode};
use fold::fold;

#[derive(Debug, Clone)]
pub struct Classifier {
    enabled: bool,
    table: CategoryTable,
}

impl Classifier {
    pub fn new(table: CategoryTable, enabled: bool) -> Self {
        Self { enabled, table }
    }

    pub fn from_config(config: &ClassificationConfig) -> Result<Self, AppError> {
        Ok(Self::new(
            CategoryTable::from_config(config)?,
            config.auto_classification,
        ))
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn classify(
        &self,
        filename: &str,
        caption: Option<&str>,
        chat_label: Option<&str>,
        command: Option<&str>,
    ) -> ClassificationResult {
        if !self.enabled {
            return ClassificationResult::new(self.table.default_category(), ReasonCode::Disabled);
        }

        if let Some(category) = command.and_then(|c| self.match_command(c)) {
            return ClassificationResult::new(category, ReasonCode::ExplicitCommand);
        }

        let tiers = [
            (caption, ReasonCode::CaptionMatch),
            (chat_label, ReasonCode::ChatLabelMatch),
            (Some(filename), ReasonCode::FilenameMatch),
        ];
        for (text, reason) in tiers {
            let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            if let Some(rule) = self.table.scan(text) {
                return ClassificationResult::new(rule.name(), reason);
            }
        }

        ClassificationResult::new(self.table.default_category(), ReasonCode::NoMatch)
    }

    fn match_command(&self, command: &str) -> Option<&str> {
        let folded = fold(command.trim().trim_start_matches('/').trim());
        if folded.is_empty() {
            return None;
        }
        // Category names across the whole table take priority over keywords
        let rules = self.table.rules();
        if let Some(rule) = rules.iter().find(|r| r.matches_name(&folded)) {
            return Some(rule.name());
        }
        let default = self.table.default_category();
        if fold(default) == folded {
            return Some(default);
        }
        rules
            .iter()
            .find(|r| r.matches_keyword(&folded))
            .map(|r| r.name())
    }
}

/// Command token at the very start of `text`: `/` followed by word characters.
///
/// A bot suffix (`/documents@my_bot`) is not part of the token.
pub fn extract_command(text: &str) -> Option<String> {
    static COMMAND: OnceLock<Option<Regex>> = OnceLock::new();
    let re = COMMAND
        .get_or_init(|| Regex::new(r"^/(\w+)").ok())
        .as_ref()?;
    re.captures(text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
