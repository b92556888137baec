use std::fs;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use photosync_core::constants::DATE_FOLDER_FORMAT;
use photosync_core::StorageStats;

use crate::traits::StorageResult;

/// Walk `root/<date>/<category>/<file>`. Hidden entries and top-level
/// directories that are not dates (such as `logs`) are skipped.
pub(crate) fn collect_stats(root: &Path) -> StorageResult<StorageStats> {
    let mut stats = StorageStats {
        root_path: root.to_path_buf(),
        ..StorageStats::default()
    };

    if !root.is_dir() {
        return Ok(stats);
    }

    for date_dir in visible_dirs(root)? {
        let Some(date) = file_name(&date_dir) else {
            continue;
        };
        if NaiveDate::parse_from_str(&date, DATE_FOLDER_FORMAT).is_err() {
            continue;
        }

        for category_dir in visible_dirs(&date_dir)? {
            let Some(category) = file_name(&category_dir) else {
                continue;
            };
            let count = stats.categories.entry(category).or_insert(0);

            for entry in fs::read_dir(&category_dir)? {
                let entry = entry?;
                if is_hidden(&entry.file_name().to_string_lossy()) {
                    continue;
                }
                let metadata = entry.metadata()?;
                if !metadata.is_file() {
                    continue;
                }
                *count += 1;
                stats.total_files += 1;
                stats.total_size_bytes += metadata.len();
            }
        }

        stats.dates.push(date);
    }

    stats.dates.sort_by(|a, b| b.cmp(a));
    stats.total_size_mb =
        (stats.total_size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0;
    Ok(stats)
}

fn visible_dirs(dir: &Path) -> io::Result<Vec<std::path::PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if is_hidden(&entry.file_name().to_string_lossy()) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
