//! Tiered data resolution
//!
//! Picks the session's initial records by trying each source in a fixed,
//! context-dependent order and adopting the first one that succeeds:
//!
//! | Context | Order |
//! |---------|-------|
//! | Public  | remote (non-empty) → cache → snapshot → defaults |
//! | Local   | cache → remote → snapshot → defaults |
//!
//! Unconfigured sources are skipped. The defaults tier cannot fail, so
//! resolution always yields records.

use crate::config::ServingContext;
use crate::error::SourceError;
use crate::store::{load_cached_records, mirror_records, LocalCache, RemoteStore, SnapshotSource};
use ranking_core::{default_records, ranking_from_document, ranking_from_envelope, Record};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

/// Source a resolution came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Remote store
    Remote,
    /// Local cache slot
    LocalCache,
    /// Bundled snapshot document
    Snapshot,
    /// Built-in records
    Defaults,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote",
            Self::LocalCache => "local cache",
            Self::Snapshot => "snapshot",
            Self::Defaults => "defaults",
        })
    }
}

const PUBLIC_ORDER: [Tier; 4] = [Tier::Remote, Tier::LocalCache, Tier::Snapshot, Tier::Defaults];
const LOCAL_ORDER: [Tier; 4] = [Tier::LocalCache, Tier::Remote, Tier::Snapshot, Tier::Defaults];

/// Outcome of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Adopted records
    pub records: Vec<Record>,
    /// Tier they came from
    pub tier: Tier,
    /// Whether a background reconciliation should follow
    pub reconcile: bool,
}

/// Run `attempt` for each key in order and return the first success
///
/// Failures are logged and skipped.
pub async fn first_success<K, T, F, Fut>(
    keys: impl IntoIterator<Item = K>,
    mut attempt: F,
) -> Option<(K, T)>
where
    K: Copy + Debug,
    F: FnMut(K) -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    for key in keys {
        match attempt(key).await {
            Ok(value) => return Some((key, value)),
            Err(error) => tracing::warn!(source = ?key, %error, "source failed, trying next"),
        }
    }
    None
}

/// Chooses the initial record set for a session
#[derive(Clone)]
pub struct Resolver {
    context: ServingContext,
    cache: Arc<dyn LocalCache>,
    remote: Option<Arc<dyn RemoteStore>>,
    snapshot: Option<Arc<dyn SnapshotSource>>,
}

impl Resolver {
    /// Create a resolver with only the cache and the defaults
    #[must_use]
    pub fn new(context: ServingContext, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            context,
            cache,
            remote: None,
            snapshot: None,
        }
    }

    /// With remote store
    #[inline]
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// With bundled snapshot
    #[inline]
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: Arc<dyn SnapshotSource>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Serving context
    #[must_use]
    pub fn context(&self) -> ServingContext {
        self.context
    }

    /// Tiers that will be tried, in order
    #[must_use]
    pub fn tier_order(&self) -> Vec<Tier> {
        let order = match self.context {
            ServingContext::Public => PUBLIC_ORDER,
            ServingContext::Local => LOCAL_ORDER,
        };
        order
            .into_iter()
            .filter(|tier| match tier {
                Tier::Remote => self.remote.is_some(),
                Tier::Snapshot => self.snapshot.is_some(),
                Tier::LocalCache | Tier::Defaults => true,
            })
            .collect()
    }

    /// Resolve the initial records
    pub async fn resolve(&self) -> Resolution {
        let found = first_success(self.tier_order(), |tier| self.attempt(tier)).await;
        let (tier, records) = found.unwrap_or_else(|| (Tier::Defaults, default_records()));
        self.adopt(tier, records).await
    }

    async fn attempt(&self, tier: Tier) -> Result<Vec<Record>, SourceError> {
        match tier {
            Tier::Remote => {
                let remote = self.remote.as_ref().ok_or_else(not_configured)?;
                let records = ranking_from_envelope(&remote.fetch().await?)?;
                if self.context.is_public() && records.is_empty() {
                    return Err(SourceError::Empty);
                }
                Ok(records)
            }
            Tier::LocalCache => load_cached_records(self.cache.as_ref()).await,
            Tier::Snapshot => {
                let snapshot = self.snapshot.as_ref().ok_or_else(not_configured)?;
                Ok(ranking_from_document(&snapshot.fetch().await?)?)
            }
            Tier::Defaults => Ok(default_records()),
        }
    }

    async fn adopt(&self, tier: Tier, records: Vec<Record>) -> Resolution {
        tracing::info!(%tier, count = records.len(), context = %self.context, "adopted ranking");

        let mirror = match tier {
            Tier::Remote => true,
            Tier::Snapshot => !records.is_empty(),
            Tier::LocalCache | Tier::Defaults => false,
        };
        if mirror {
            if let Err(error) = mirror_records(self.cache.as_ref(), &records).await {
                tracing::warn!(%error, "could not mirror ranking to local cache");
            }
        }

        Resolution {
            reconcile: tier == Tier::LocalCache && self.remote.is_some(),
            records,
            tier,
        }
    }
}

fn not_configured() -> SourceError {
    SourceError::Unavailable("not configured".to_string())
}
