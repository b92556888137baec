use indexmap::IndexMap;
use regex::Regex;

use super::fold::fold;
use crate::config::ClassificationConfig;
use crate::error::AppError;

/// Characters that make up a token. Anything else, `_` included, separates tokens.
const TOKEN_CLASS: &str = r"\p{L}\p{M}\p{N}";

/// One category and its keywords, with the compiled whole-word matcher.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    name: String,
    keywords: Vec<String>,
    folded_name: String,
    folded_keywords: Vec<String>,
    matcher: Option<Regex>,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, keywords: &[String]) -> Result<Self, AppError> {
        let name = name.into();
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        let folded_keywords: Vec<String> = keywords.iter().map(|k| fold(k)).collect();

        let matcher = if folded_keywords.is_empty() {
            None
        } else {
            let alternatives = folded_keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(
                "(?:^|[^{cls}])(?:{alternatives})(?:[^{cls}]|$)",
                cls = TOKEN_CLASS
            );
            Some(Regex::new(&pattern).map_err(|e| {
                AppError::Configuration(format!("keywords of category {:?}: {}", name, e))
            })?)
        };

        Ok(Self {
            folded_name: fold(&name),
            name,
            keywords,
            folded_keywords,
            matcher,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether any keyword occurs in `folded_text` as a standalone token.
    pub(crate) fn matches_text(&self, folded_text: &str) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|re| re.is_match(folded_text))
    }

    pub(crate) fn matches_name(&self, folded_command: &str) -> bool {
        self.folded_name == folded_command
    }

    pub(crate) fn matches_keyword(&self, folded_command: &str) -> bool {
        self.folded_keywords.iter().any(|k| k == folded_command)
    }
}

/// Ordered category rules plus the default category.
///
/// Built once from configuration and never mutated; a reload builds a new table.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
    default_category: String,
}

impl CategoryTable {
    pub fn new(
        default_category: impl Into<String>,
        categories: &IndexMap<String, Vec<String>>,
    ) -> Result<Self, AppError> {
        let rules = categories
            .iter()
            .map(|(name, keywords)| CategoryRule::new(name.clone(), keywords))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rules,
            default_category: default_category.into(),
        })
    }

    pub fn from_config(config: &ClassificationConfig) -> Result<Self, AppError> {
        Self::new(config.default_category.clone(), &config.categories)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }

    /// First rule, in table order, with a keyword hit in `text`.
    pub(crate) fn scan(&self, text: &str) -> Option<&CategoryRule> {
        let folded = fold(text);
        self.rules.iter().find(|rule| rule.matches_text(&folded))
    }
}
