use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A file written into the storage tree. Never overwritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub absolute_path: PathBuf,
    pub category: String,
    /// `YYYY-MM-DD`
    pub date_folder: String,
    pub final_name: String,
    pub size_bytes: u64,
}

/// Aggregate view of the storage tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageStats {
    pub root_path: PathBuf,
    pub total_files: u64,
    pub total_size_bytes: u64,
    pub total_size_mb: f64,
    pub categories: BTreeMap<String, u64>,
    /// Date folders, newest first
    pub dates: Vec<String>,
}
