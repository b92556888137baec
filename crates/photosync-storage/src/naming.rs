//! Destination naming rules

use chrono::NaiveDateTime;
use photosync_core::config::validate_path_component;
use photosync_core::constants::{DATE_FOLDER_FORMAT, FILE_TIMESTAMP_FORMAT};

use crate::traits::{StorageError, StorageResult};

/// Characters replaced by `_` in file names
const UNSAFE_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Longest sanitized name kept, in bytes
const MAX_BASE_NAME_BYTES: usize = 200;
const MAX_KEPT_EXTENSION_BYTES: usize = 16;

/// Make `name` safe as a single file name.
///
/// Unsafe and control characters become `_`, runs of `_` and of spaces are
/// collapsed, surrounding whitespace is trimmed. An empty result, or one that is
/// only dots or a bare extension, is replaced by `file_<timestamp>` (keeping the
/// extension). Applying it twice gives the same result as applying it once.
pub fn sanitize_filename(name: &str, now: NaiveDateTime) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if UNSAFE_CHARS.contains(&c) || c.is_control() {
            '_'
        } else {
            c
        };
        if (c == '_' || c == ' ') && out.ends_with(c) {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim();
    let fallback = || format!("file_{}", now.format(FILE_TIMESTAMP_FORMAT));

    let sanitized = if trimmed.chars().all(|c| c == '.') {
        fallback()
    } else if trimmed.starts_with('.') {
        format!("{}{}", fallback(), trimmed)
    } else {
        trimmed.to_string()
    };

    truncate_name(sanitized)
}

fn truncate_name(name: String) -> String {
    if name.len() <= MAX_BASE_NAME_BYTES {
        return name;
    }
    let (stem, ext) = split_extension(&name);
    let ext = if ext.len() <= MAX_KEPT_EXTENSION_BYTES {
        ext
    } else {
        ""
    };
    let budget = MAX_BASE_NAME_BYTES - ext.len();
    let mut cut = budget.min(stem.len());
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", stem[..cut].trim_end(), ext)
}

/// Split at the last dot. A leading dot does not start an extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// `<timestamp>_<stem>[_<n>]<.ext>`, extension lower-cased. `n = 0` means no suffix.
pub fn candidate_name(timestamp: NaiveDateTime, base_name: &str, n: u32) -> String {
    let (stem, ext) = split_extension(base_name);
    let ts = timestamp.format(FILE_TIMESTAMP_FORMAT);
    let ext = ext.to_lowercase();
    if n == 0 {
        format!("{}_{}{}", ts, stem, ext)
    } else {
        format!("{}_{}_{}{}", ts, stem, n, ext)
    }
}

pub fn date_folder(timestamp: NaiveDateTime) -> String {
    timestamp.format(DATE_FOLDER_FORMAT).to_string()
}

/// Categories become directory names and must not escape the date folder.
pub fn validate_category(category: &str) -> StorageResult<()> {
    validate_path_component(category)
        .map_err(|reason| StorageError::InvalidCategory(format!("{:?}: {}", category, reason)))
}
