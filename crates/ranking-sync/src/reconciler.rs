//! Background reconciliation
//!
//! After a session starts from the local cache, one pass fetches the remote
//! ranking and, if it differs from what is shown and nothing was edited in
//! the meantime, swaps it in.

use crate::error::SourceError;
use crate::state::{RecordStore, SwapOutcome};
use crate::store::{mirror_records, LocalCache, RemoteStore};
use ranking_core::{ranking_from_envelope, Record};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What a reconciliation pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Remote records replaced the store contents (new version)
    Applied(u64),
    /// Remote records equal the current ones
    Unchanged,
    /// The store changed while fetching; remote records discarded
    Stale,
    /// Fetch or validation failed; nothing changed
    Failed,
}

/// One-shot remote refresh of a [`RecordStore`]
#[derive(Clone)]
pub struct Reconciler {
    remote: Arc<dyn RemoteStore>,
    cache: Arc<dyn LocalCache>,
    store: RecordStore,
}

impl Reconciler {
    /// Create a reconciler
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn LocalCache>,
        store: RecordStore,
    ) -> Self {
        Self {
            remote,
            cache,
            store,
        }
    }

    /// Run one pass
    ///
    /// Never fails: fetch errors are logged and reported as
    /// [`ReconcileOutcome::Failed`].
    pub async fn run(&self) -> ReconcileOutcome {
        let started_at = self.store.version();

        let records = match self.fetch().await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(%error, "background refresh failed");
                return ReconcileOutcome::Failed;
            }
        };

        match self.store.replace_if_unchanged(started_at, records) {
            SwapOutcome::Applied(version) => {
                tracing::info!(version, "ranking updated from remote");
                let current = self.store.records();
                if let Err(error) = mirror_records(self.cache.as_ref(), &current).await {
                    tracing::warn!(%error, "could not mirror refreshed ranking");
                }
                ReconcileOutcome::Applied(version)
            }
            SwapOutcome::Unchanged => {
                tracing::debug!("remote ranking matches local copy");
                ReconcileOutcome::Unchanged
            }
            SwapOutcome::Stale => {
                tracing::debug!(started_at, "store changed during fetch, discarding remote copy");
                ReconcileOutcome::Stale
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        Ok(ranking_from_envelope(&self.remote.fetch().await?)?)
    }

    /// Run one pass on the tokio runtime
    #[must_use]
    pub fn spawn(self) -> JoinHandle<ReconcileOutcome> {
        tokio::spawn(async move { self.run().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::store::{MemoryCache, SaveReceipt, RANKING_SLOT};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StaticRemote(Result<Value, String>);

    #[async_trait]
    impl RemoteStore for StaticRemote {
        async fn fetch(&self) -> Result<Value, SourceError> {
            self.0.clone().map_err(SourceError::Unavailable)
        }

        async fn save(&self, _records: &[Record]) -> Result<SaveReceipt, PersistenceError> {
            Err(PersistenceError::Transport("read only".to_string()))
        }
    }

    fn setup(remote: Result<Value, String>) -> (Reconciler, RecordStore, Arc<MemoryCache>) {
        let store = RecordStore::new();
        store.adopt(vec![Record::new("Ana", "Ops", "", 1)]);
        let cache = Arc::new(MemoryCache::new());
        let reconciler =
            Reconciler::new(Arc::new(StaticRemote(remote)), cache.clone(), store.clone());
        (reconciler, store, cache)
    }

    #[tokio::test]
    async fn applies_different_remote_data() {
        let (reconciler, store, cache) =
            setup(Ok(json!({ "ranking": [{ "nombre": "Luis", "puntos": 5 }] })));
        assert_eq!(reconciler.run().await, ReconcileOutcome::Applied(2));
        assert_eq!(store.records()[0].name, "Luis");
        assert!(cache.get(RANKING_SLOT).unwrap().contains("Luis"));
    }

    #[tokio::test]
    async fn equal_data_is_left_alone() {
        let (reconciler, store, cache) = setup(Ok(json!({
            "ranking": [{ "nombre": "Ana", "area": "Ops", "cargo": "", "puntos": 1 }]
        })));
        assert_eq!(reconciler.run().await, ReconcileOutcome::Unchanged);
        assert_eq!(store.version(), 1);
        assert!(cache.get(RANKING_SLOT).is_none());
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let (reconciler, store, _) = setup(Err("offline".to_string()));
        assert_eq!(reconciler.run().await, ReconcileOutcome::Failed);

        let (invalid, _, _) = setup(Ok(json!({ "ranking": 3 })));
        assert_eq!(invalid.spawn().await.unwrap(), ReconcileOutcome::Failed);
        assert_eq!(store.version(), 1);
    }
}
