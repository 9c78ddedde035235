//! In-memory cache

use super::LocalCache;
use crate::error::CacheError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Local cache kept in process memory
#[derive(Debug, Default)]
pub struct MemoryCache {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot
    #[must_use]
    pub fn with_slot(self, slot: impl Into<String>, blob: impl Into<String>) -> Self {
        self.slots.lock().insert(slot.into(), blob.into());
        self
    }

    /// Current contents of a slot
    #[must_use]
    pub fn get(&self, slot: &str) -> Option<String> {
        self.slots.lock().get(slot).cloned()
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn read(&self, slot: &str) -> Result<Option<String>, CacheError> {
        Ok(self.get(slot))
    }

    async fn write(&self, slot: &str, blob: &str) -> Result<(), CacheError> {
        self.slots.lock().insert(slot.to_string(), blob.to_string());
        Ok(())
    }
}
