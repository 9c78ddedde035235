//! Backends the engine reads from and writes to
//!
//! - [`RemoteStore`]: the authoritative HTTP store
//! - [`LocalCache`]: named string slots on this machine
//! - [`SnapshotSource`]: the bundled, read-only ranking document

pub mod file;
pub mod http;
pub mod memory;

pub use file::{FileCache, FileSnapshot};
pub use http::{HttpRemoteStore, HttpSnapshot};
pub use memory::MemoryCache;

use crate::error::{CacheError, PersistenceError, SourceError};
use async_trait::async_trait;
use ranking_core::{validate_records, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cache slot holding the record list
pub const RANKING_SLOT: &str = "rankingData";

/// Server acknowledgement of a save
///
/// Any 200 response is an acceptance unless the body says
/// `"success": false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveReceipt {
    /// Whether the server accepted the data
    pub success: bool,
    /// Human-readable status
    pub message: String,
    /// Number of records stored
    pub count: usize,
}

impl Default for SaveReceipt {
    fn default() -> Self {
        Self {
            success: true,
            message: String::new(),
            count: 0,
        }
    }
}

/// Authoritative remote store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the raw ranking document (`{ "ranking": [...] }`)
    async fn fetch(&self) -> Result<Value, SourceError>;

    /// Replace the stored ranking with `records`
    async fn save(&self, records: &[Record]) -> Result<SaveReceipt, PersistenceError>;
}

/// Local key/value cache of string blobs
///
/// Each write replaces the whole slot atomically.
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Read a slot, `None` if it was never written
    async fn read(&self, slot: &str) -> Result<Option<String>, CacheError>;

    /// Replace a slot
    async fn write(&self, slot: &str, blob: &str) -> Result<(), CacheError>;
}

/// Read-only bundled ranking document
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the raw document (`{ "ranking": [...] }` or a bare array)
    async fn fetch(&self) -> Result<Value, SourceError>;
}

/// Read the cached record list
///
/// # Errors
/// - `SourceError::Missing` if the slot is empty
/// - `SourceError::Malformed` if the blob is not JSON
/// - `SourceError::InvalidPayload` if it is not an array
/// - `SourceError::Empty` if the array is empty
pub async fn load_cached_records(cache: &dyn LocalCache) -> Result<Vec<Record>, SourceError> {
    let blob = cache
        .read(RANKING_SLOT)
        .await?
        .ok_or_else(|| SourceError::Missing(RANKING_SLOT.to_string()))?;
    let value: Value =
        serde_json::from_str(&blob).map_err(|e| SourceError::Malformed(e.to_string()))?;
    let records = validate_records(&value)?;
    if records.is_empty() {
        return Err(SourceError::Empty);
    }
    Ok(records)
}

/// Write the record list to the cache slot
///
/// # Errors
/// `CacheError` if serialization or the write fails.
pub async fn mirror_records(cache: &dyn LocalCache, records: &[Record]) -> Result<(), CacheError> {
    let blob = serde_json::to_string(records)?;
    cache.write(RANKING_SLOT, &blob).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_round_trip() {
        let cache = MemoryCache::new();
        let records = vec![Record::new("Ana", "Ops", "Dev", 3)];
        mirror_records(&cache, &records).await.unwrap();
        assert_eq!(load_cached_records(&cache).await.unwrap(), records);
    }

    #[tokio::test]
    async fn empty_or_missing_cache_fails() {
        let cache = MemoryCache::new();
        assert!(matches!(
            load_cached_records(&cache).await,
            Err(SourceError::Missing(_))
        ));

        cache.write(RANKING_SLOT, "[]").await.unwrap();
        assert!(matches!(
            load_cached_records(&cache).await,
            Err(SourceError::Empty)
        ));

        cache.write(RANKING_SLOT, "{not json").await.unwrap();
        assert!(matches!(
            load_cached_records(&cache).await,
            Err(SourceError::Malformed(_))
        ));

        cache.write(RANKING_SLOT, r#"{"a":1}"#).await.unwrap();
        assert!(matches!(
            load_cached_records(&cache).await,
            Err(SourceError::InvalidPayload(_))
        ));
    }

    #[test]
    fn receipt_tolerates_missing_fields() {
        let receipt: SaveReceipt = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.count, 0);

        let receipt: SaveReceipt =
            serde_json::from_str(r#"{"message":"Se guardaron 1 colaboradores","count":1}"#).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.count, 1);

        let receipt: SaveReceipt = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!receipt.success);
    }
}
