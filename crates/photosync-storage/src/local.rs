use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, Utc};
use photosync_core::{StorageStats, StoredFile};
use tempfile::NamedTempFile;
use tokio::fs;

use crate::last_saved::{LastSavedReader, LastSavedWriter};
use crate::naming::{candidate_name, date_folder, sanitize_filename, validate_category};
use crate::stats::collect_stats;
use crate::traits::{MediaStore, StorageError, StorageResult};

/// Upper bound on `_n` suffixes tried for one name
const MAX_COLLISION_SUFFIX: u32 = 10_000;

/// Prefix of in-flight temp files; the leading dot keeps them out of stats
const TEMP_PREFIX: &str = ".photosync-";

/// Local filesystem storage implementation
pub struct LocalStorage {
    root: PathBuf,
    last_saved: LastSavedWriter,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `root`, creating it if needed.
    ///
    /// An unusable root is a configuration error.
    pub async fn new(root: impl Into<PathBuf>, last_saved: LastSavedWriter) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let metadata = fs::metadata(&root).await.map_err(|e| {
            StorageError::ConfigError(format!("Cannot access {}: {}", root.display(), e))
        })?;
        if metadata.permissions().readonly() {
            return Err(StorageError::ConfigError(format!(
                "Storage directory {} is read-only",
                root.display()
            )));
        }

        Ok(Self { root, last_saved })
    }

    pub fn last_saved(&self) -> LastSavedReader {
        self.last_saved.reader()
    }
}

#[async_trait]
impl MediaStore for LocalStorage {
    async fn save(
        &self,
        data: Vec<u8>,
        category: &str,
        original_name: &str,
        timestamp: NaiveDateTime,
    ) -> StorageResult<StoredFile> {
        validate_category(category)?;

        let date = date_folder(timestamp);
        let dir = self.root.join(&date).join(category);
        let base_name = sanitize_filename(original_name, Local::now().naive_local());
        let size = data.len() as u64;
        let start = Instant::now();

        let write_dir = dir.clone();
        let (path, final_name) = tokio::task::spawn_blocking(move || {
            write_unique(&write_dir, timestamp, &base_name, &data)
        })
        .await
        .map_err(|e| StorageError::TaskFailed(e.to_string()))??;

        self.last_saved.record(Utc::now());

        tracing::info!(
            path = %path.display(),
            category = %category,
            size_bytes = size,
            duration_ms = start.elapsed().as_millis() as u64,
            "File saved"
        );

        Ok(StoredFile {
            absolute_path: path,
            category: category.to_string(),
            date_folder: date,
            final_name,
            size_bytes: size,
        })
    }

    async fn stats(&self) -> StorageResult<StorageStats> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || collect_stats(&root))
            .await
            .map_err(|e| StorageError::TaskFailed(e.to_string()))?
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Write `data` to a temp file in `dir`, then claim the first free candidate
/// name with a no-clobber rename. Either the final file exists with all bytes,
/// or nothing is left behind.
fn write_unique(
    dir: &Path,
    timestamp: NaiveDateTime,
    base_name: &str,
    data: &[u8],
) -> StorageResult<(PathBuf, String)> {
    std::fs::create_dir_all(dir).map_err(|e| {
        StorageError::WriteFailed(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file in {}: {}", dir.display(), e))
        })?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    make_world_readable(&tmp)?;

    for n in 0..=MAX_COLLISION_SUFFIX {
        let name = candidate_name(timestamp, base_name, n);
        let path = dir.join(&name);
        match tmp.persist_noclobber(&path) {
            Ok(_) => return Ok((path, name)),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), "Name taken, trying next suffix");
                tmp = e.file;
            }
            Err(e) => {
                return Err(StorageError::WriteFailed(format!(
                    "Failed to persist {}: {}",
                    path.display(),
                    e.error
                )))
            }
        }
    }

    Err(StorageError::WriteFailed(format!(
        "No free name for {} in {} after {} attempts",
        base_name,
        dir.display(),
        MAX_COLLISION_SUFFIX
    )))
}

#[cfg(unix)]
fn make_world_readable(tmp: &NamedTempFile) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn make_world_readable(_tmp: &NamedTempFile) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::last_saved::last_saved_state;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    async fn storage() -> (TempDir, LocalStorage, LastSavedReader) {
        let dir = tempfile::tempdir().unwrap();
        let (writer, reader) = last_saved_state();
        let storage = LocalStorage::new(dir.path().join("photos"), writer)
            .await
            .unwrap();
        (dir, storage, reader)
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_save_layout() {
        let (_dir, storage, reader) = storage().await;
        assert!(reader.get().is_none());

        let stored = storage
            .save(b"jpeg bytes".to_vec(), "Sprinter", "img001.jpg", ts())
            .await
            .unwrap();

        let expected = storage
            .root()
            .join("2024-06-01")
            .join("Sprinter")
            .join("20240601_093000_img001.jpg");
        assert_eq!(stored.absolute_path, expected);
        assert_eq!(stored.final_name, "20240601_093000_img001.jpg");
        assert_eq!(stored.date_folder, "2024-06-01");
        assert_eq!(stored.size_bytes, 10);
        assert_eq!(std::fs::read(&expected).unwrap(), b"jpeg bytes");
        assert!(reader.get().is_some());
        assert!(storage.last_saved().get().is_some());
    }

    #[tokio::test]
    async fn test_collisions_get_suffixes() {
        let (_dir, storage, _) = storage().await;
        let first = storage.save(b"1".to_vec(), "Other", "scan.pdf", ts()).await.unwrap();
        let second = storage.save(b"2".to_vec(), "Other", "scan.pdf", ts()).await.unwrap();
        let third = storage.save(b"3".to_vec(), "Other", "scan.pdf", ts()).await.unwrap();

        assert_eq!(first.final_name, "20240601_093000_scan.pdf");
        assert_eq!(second.final_name, "20240601_093000_scan_1.pdf");
        assert_eq!(third.final_name, "20240601_093000_scan_2.pdf");
        assert_eq!(std::fs::read(&first.absolute_path).unwrap(), b"1");
        assert_eq!(std::fs::read(&second.absolute_path).unwrap(), b"2");
    }

    #[tokio::test]
    async fn test_concurrent_saves_never_overwrite() {
        let (_dir, storage, _) = storage().await;
        let storage = Arc::new(storage);

        let tasks: Vec<_> = (0..16u8)
            .map(|i| {
                let storage = Arc::clone(&storage);
                tokio::spawn(async move {
                    storage
                        .save(vec![i; 64], "Legal", "court.pdf", ts())
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut names = Vec::new();
        for task in tasks {
            names.push(task.await.unwrap().final_name);
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 16);

        // No temp files left behind, every file complete
        let dir = storage.root().join("2024-06-01").join("Legal");
        let on_disk = entries(&dir);
        assert_eq!(on_disk.len(), 16);
        for name in on_disk {
            assert!(!name.starts_with('.'));
            assert_eq!(std::fs::metadata(dir.join(name)).unwrap().len(), 64);
        }
    }

    #[tokio::test]
    async fn test_unsafe_name_and_category() {
        let (_dir, storage, _) = storage().await;
        let stored = storage
            .save(b"x".to_vec(), "Documents", "docs/../../etc/passwd", ts())
            .await
            .unwrap();
        assert_eq!(stored.final_name, "20240601_093000_docs_.._.._etc_passwd");
        assert!(stored.absolute_path.starts_with(storage.root()));

        let err = storage
            .save(b"x".to_vec(), "../outside", "a.jpg", ts())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidCategory(_)));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_nothing() {
        let (_dir, storage, reader) = storage().await;
        // A file where the date folder should be makes directory creation fail
        std::fs::write(storage.root().join("2024-06-01"), b"in the way").unwrap();

        let err = storage
            .save(b"data".to_vec(), "Other", "a.jpg", ts())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed(_)));
        assert!(reader.get().is_none());
        assert_eq!(entries(storage.root()), vec!["2024-06-01".to_string()]);
    }

    #[tokio::test]
    async fn test_root_that_is_a_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"").unwrap();
        let (writer, _) = last_saved_state();

        let err = LocalStorage::new(&file, writer).await.err().unwrap();
        assert!(matches!(err, StorageError::ConfigError(_)));
    }
}
