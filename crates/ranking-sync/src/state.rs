//! Shared record store
//!
//! Holds the session's [`RecordSet`] behind a lock together with a version
//! counter. Every replacement or local mutation bumps the version and
//! notifies subscribers, which is how views know to re-render and how the
//! reconciler detects that it lost a race.

use parking_lot::RwLock;
use ranking_core::{EditError, Record, RecordSet};
use std::sync::Arc;
use tokio::sync::watch;

/// Result of a compare-and-swap replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Store changed since the expected version; nothing applied
    Stale,
    /// Records already equal; nothing applied
    Unchanged,
    /// Records replaced; new version
    Applied(u64),
}

#[derive(Debug, Default)]
struct Inner {
    set: RecordSet,
    version: u64,
}

/// Versioned, shareable record store
#[derive(Debug, Clone)]
pub struct RecordStore {
    inner: Arc<RwLock<Inner>>,
    changes: Arc<watch::Sender<u64>>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// Create an empty store at version 0
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            changes: Arc::new(changes),
        }
    }

    /// Current version
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    /// Copy of the current set
    #[must_use]
    pub fn snapshot(&self) -> RecordSet {
        self.inner.read().set.clone()
    }

    /// Copy of the current records
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.inner.read().set.to_records()
    }

    /// Run `f` against the current set without copying it
    pub fn with_set<T>(&self, f: impl FnOnce(&RecordSet) -> T) -> T {
        f(&self.inner.read().set)
    }

    /// Receiver notified with the new version after every change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Replace the whole set unconditionally
    pub fn adopt(&self, records: Vec<Record>) -> u64 {
        let version = {
            let mut inner = self.inner.write();
            inner.set = RecordSet::from_records(records);
            inner.version += 1;
            inner.version
        };
        self.changes.send_replace(version);
        version
    }

    /// Apply a mutation atomically
    ///
    /// `f` runs on a copy; the copy replaces the set and the version is
    /// bumped only if `f` succeeds, so a failed edit leaves no trace.
    ///
    /// # Errors
    /// Whatever `f` returns.
    pub fn mutate<T>(
        &self,
        f: impl FnOnce(&mut RecordSet) -> Result<T, EditError>,
    ) -> Result<(T, u64), EditError> {
        let (value, version) = {
            let mut inner = self.inner.write();
            let mut draft = inner.set.clone();
            let value = f(&mut draft)?;
            inner.set = draft;
            inner.version += 1;
            (value, inner.version)
        };
        self.changes.send_replace(version);
        Ok((value, version))
    }

    /// Replace the set only if nothing changed since `expected` and the
    /// contents actually differ
    pub fn replace_if_unchanged(&self, expected: u64, records: Vec<Record>) -> SwapOutcome {
        let version = {
            let mut inner = self.inner.write();
            if inner.version != expected {
                return SwapOutcome::Stale;
            }
            if inner.set.same_records(&records) {
                return SwapOutcome::Unchanged;
            }
            inner.set = RecordSet::from_records(records);
            inner.version += 1;
            inner.version
        };
        self.changes.send_replace(version);
        SwapOutcome::Applied(version)
    }
}
