//! Filesystem cache and snapshot
//!
//! Each cache slot is one `<slot>.json` file under the cache directory.
//! Writes go to a temporary file in the same directory that is then renamed
//! over the slot, so readers see either the old blob or the new one.

use super::{LocalCache, SnapshotSource};
use crate::error::{CacheError, SourceError};
use async_trait::async_trait;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Local cache backed by a directory
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at `dir` (created on first write)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, CacheError> {
        validate_slot(slot)?;
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

#[async_trait]
impl LocalCache for FileCache {
    async fn read(&self, slot: &str) -> Result<Option<String>, CacheError> {
        let path = self.slot_path(slot)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(CacheError::io(path, error)),
        }
    }

    async fn write(&self, slot: &str, blob: &str) -> Result<(), CacheError> {
        let path = self.slot_path(slot)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::io(&self.dir, e))?;

        let dir = self.dir.clone();
        let blob = blob.to_string();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, blob.as_bytes()))
            .await
            .map_err(|e| CacheError::Internal(e.to_string()))?
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CacheError::io(dir, e))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| CacheError::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| CacheError::io(path, e.error))?;
    Ok(())
}

fn validate_slot(slot: &str) -> Result<(), CacheError> {
    let separator = |c: char| c == '/' || c == '\\';
    if slot.is_empty() || slot == "." || slot == ".." || slot.contains(separator) {
        return Err(CacheError::InvalidSlot(slot.to_string()));
    }
    Ok(())
}

/// Snapshot document stored on disk
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    /// Create a snapshot source reading `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshot {
    async fn fetch(&self) -> Result<Value, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", self.path.display())))?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_and_reads_slots() {
        let dir = tempdir().expect("tempdir");
        let cache = FileCache::new(dir.path().join("cache"));
        cache.write("rankingData", "[1,2]").await.expect("write");
        cache.write("rankingData", "[3]").await.expect("overwrite");
        let blob = cache.read("rankingData").await.expect("read");
        assert_eq!(blob.as_deref(), Some("[3]"));
    }

    #[tokio::test]
    async fn missing_slot_returns_none() {
        let dir = tempdir().expect("tempdir");
        let cache = FileCache::new(dir.path());
        assert!(cache.read("adminUsers").await.expect("read").is_none());
    }

    #[tokio::test]
    async fn invalid_slot_rejected() {
        let dir = tempdir().expect("tempdir");
        let cache = FileCache::new(dir.path());
        for slot in ["", "..", "a/b", "a\\b"] {
            let err = cache.write(slot, "x").await.expect_err("invalid slot");
            assert!(matches!(err, CacheError::InvalidSlot(_)), "slot {slot:?}");
        }
    }

    #[tokio::test]
    async fn leaves_no_temp_files_behind() {
        let dir = tempdir().expect("tempdir");
        let cache = FileCache::new(dir.path());
        cache.write("rankingData", "[]").await.expect("write");
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["rankingData.json".to_string()]);
    }

    #[tokio::test]
    async fn snapshot_reads_json_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ranking.json");
        std::fs::write(&path, r#"{"ranking":[{"nombre":"Ana"}]}"#).expect("seed");
        let value = FileSnapshot::new(&path).fetch().await.expect("fetch");
        assert_eq!(value["ranking"][0]["nombre"], "Ana");

        let missing = FileSnapshot::new(dir.path().join("nope.json")).fetch().await;
        assert!(matches!(missing, Err(SourceError::Unavailable(_))));
    }
}
