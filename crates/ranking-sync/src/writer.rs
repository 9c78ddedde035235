//! Persistence writer
//!
//! Saves the whole record set: to the remote store when one is configured,
//! and always to the local cache so that a failed remote write never loses
//! the edit on this machine.

use crate::config::ServingContext;
use crate::error::CacheError;
use crate::store::{mirror_records, LocalCache, RemoteStore};
use ranking_core::Record;
use std::sync::Arc;

/// Message reported when only the local cache is written
pub const CACHE_ONLY_MESSAGE: &str = "Datos guardados en localStorage";

/// Result of a save, for the editor to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Whether the authoritative store accepted the data
    pub success: bool,
    /// Server message or error detail
    pub message: String,
    /// Whether the outcome should be shown to the user
    pub surface: bool,
}

/// Writes record sets to the remote store and the local cache
#[derive(Clone)]
pub struct PersistenceWriter {
    context: ServingContext,
    cache: Arc<dyn LocalCache>,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl PersistenceWriter {
    /// Create a writer that only uses the local cache
    #[must_use]
    pub fn new(context: ServingContext, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            context,
            cache,
            remote: None,
        }
    }

    /// With remote store
    #[inline]
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Save `records`
    ///
    /// With a remote store, the outcome reflects the remote write; the cache
    /// is written either way. Without one, the cache write is the outcome.
    ///
    /// # Errors
    /// `CacheError` only when no remote store is configured and the cache
    /// write fails.
    pub async fn save(&self, records: &[Record]) -> Result<SaveOutcome, CacheError> {
        let Some(remote) = &self.remote else {
            mirror_records(self.cache.as_ref(), records).await?;
            tracing::info!(count = records.len(), "ranking saved to local cache");
            return Ok(SaveOutcome {
                success: true,
                message: CACHE_ONLY_MESSAGE.to_string(),
                surface: false,
            });
        };

        let result = remote.save(records).await;

        if let Err(error) = mirror_records(self.cache.as_ref(), records).await {
            tracing::warn!(%error, "could not mirror saved ranking to local cache");
        }

        let surface = self.context.is_public();
        Ok(match result {
            Ok(receipt) => {
                tracing::info!(count = receipt.count, "ranking saved to server");
                SaveOutcome {
                    success: true,
                    message: receipt.message,
                    surface,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "server save failed, kept local copy");
                SaveOutcome {
                    success: false,
                    message: error.to_string(),
                    surface,
                }
            }
        })
    }
}
