//! Viewer and editor sessions
//!
//! A session owns one [`RecordStore`] plus its view state. The viewer only
//! reads; the editor mutates by [`RecordId`] and persists after every
//! change.

use crate::config::{RankingConfig, ServingContext, SnapshotLocation};
use crate::error::{SyncError, SyncResult};
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crate::resolver::{Resolution, Resolver, Tier};
use crate::state::RecordStore;
use crate::store::{
    FileCache, FileSnapshot, HttpRemoteStore, HttpSnapshot, LocalCache, RemoteStore,
    SnapshotSource,
};
use crate::writer::{PersistenceWriter, SaveOutcome};
use ranking_core::csv::{self, encode_areas, encode_people};
use ranking_core::view::sorted_entries;
use ranking_core::{
    aggregate_by_area, members_of_area, AreaView, AreaViewState, Entry, PeopleView,
    PeopleViewState, Record, RecordDraft, RecordId, DEFAULT_PAGE_SIZE,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The set of backends a session talks to
#[derive(Clone)]
pub struct Backends {
    context: ServingContext,
    cache: Arc<dyn LocalCache>,
    remote: Option<Arc<dyn RemoteStore>>,
    snapshot: Option<Arc<dyn SnapshotSource>>,
    page_size: usize,
}

impl Backends {
    /// Create backends with only a local cache
    #[must_use]
    pub fn new(context: ServingContext, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            context,
            cache,
            remote: None,
            snapshot: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Build the backends described by `config`
    ///
    /// # Errors
    /// `SyncError::Source` if an HTTP client cannot be created.
    pub fn from_config(config: &RankingConfig) -> SyncResult<Self> {
        let context = config.serving_context();
        let cache: Arc<dyn LocalCache> = Arc::new(FileCache::new(&config.cache_dir));
        let mut backends = Self::new(context, cache).with_page_size(config.page_size);

        if let Some(base) = config.api_base() {
            let remote = HttpRemoteStore::new(base, config.request_timeout())?;
            backends = backends.with_remote(Arc::new(remote));
        }

        let snapshot: Arc<dyn SnapshotSource> = match &config.snapshot {
            SnapshotLocation::File(path) => Arc::new(FileSnapshot::new(path)),
            SnapshotLocation::Url(url) => {
                Arc::new(HttpSnapshot::new(url.clone(), config.request_timeout())?)
            }
        };
        tracing::debug!(%context, remote = backends.remote.is_some(), "backends configured");
        Ok(backends.with_snapshot(snapshot))
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

    /// With people view page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Serving context
    #[must_use]
    pub fn context(&self) -> ServingContext {
        self.context
    }

    /// Local cache
    #[must_use]
    pub fn cache(&self) -> Arc<dyn LocalCache> {
        Arc::clone(&self.cache)
    }

    /// Resolver using the tier order of `context`
    #[must_use]
    pub fn resolver(&self, context: ServingContext) -> Resolver {
        let mut resolver = Resolver::new(context, self.cache());
        if let Some(remote) = &self.remote {
            resolver = resolver.with_remote(Arc::clone(remote));
        }
        if let Some(snapshot) = &self.snapshot {
            resolver = resolver.with_snapshot(Arc::clone(snapshot));
        }
        resolver
    }

    /// Writer for this context
    #[must_use]
    pub fn writer(&self) -> PersistenceWriter {
        let writer = PersistenceWriter::new(self.context, self.cache());
        match &self.remote {
            Some(remote) => writer.with_remote(Arc::clone(remote)),
            None => writer,
        }
    }

    fn reconciler(&self, store: &RecordStore) -> Option<Reconciler> {
        self.remote
            .as_ref()
            .map(|remote| Reconciler::new(Arc::clone(remote), self.cache(), store.clone()))
    }
}

/// Read-only session behind the public ranking page
pub struct ViewerSession {
    store: RecordStore,
    people: PeopleViewState,
    areas: AreaViewState,
    tier: Tier,
    reconciliation: Option<JoinHandle<ReconcileOutcome>>,
}

impl ViewerSession {
    /// Resolve the initial records and start a background refresh if the
    /// resolver asks for one
    pub async fn open(backends: &Backends) -> Self {
        let store = RecordStore::new();
        let Resolution {
            records,
            tier,
            reconcile,
        } = backends.resolver(backends.context).resolve().await;
        store.adopt(records);

        let reconciliation = if reconcile {
            backends.reconciler(&store).map(Reconciler::spawn)
        } else {
            None
        };

        Self {
            people: PeopleViewState::new().with_page_size(backends.page_size),
            areas: AreaViewState::new(),
            store,
            tier,
            reconciliation,
        }
    }

    /// Tier the initial records came from
    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Shared store
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Receiver notified whenever the records change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    /// Update the people filter; the page resets to 1 if it changed
    pub fn set_people_filter(&mut self, filter: &str) -> bool {
        self.people.set_filter(filter)
    }

    /// Update the area filter
    pub fn set_area_filter(&mut self, filter: &str) -> bool {
        self.areas.set_filter(filter)
    }

    /// Jump to a people page; out-of-range pages are ignored
    pub fn go_to_page(&mut self, page: usize) -> bool {
        let people = &mut self.people;
        self.store.with_set(|set| people.go_to_page(page, set))
    }

    /// Next people page
    pub fn next_page(&mut self) -> bool {
        let people = &mut self.people;
        self.store.with_set(|set| people.next_page(set))
    }

    /// Previous people page
    pub fn prev_page(&mut self) -> bool {
        let people = &mut self.people;
        self.store.with_set(|set| people.prev_page(set))
    }

    /// Current people view
    #[must_use]
    pub fn people_view(&self) -> PeopleView {
        self.store.with_set(|set| self.people.build(set))
    }

    /// Current area view
    #[must_use]
    pub fn area_view(&self) -> AreaView {
        self.store.with_set(|set| self.areas.build(set))
    }

    /// Wait for the background refresh, if one was started
    pub async fn wait_reconciliation(&mut self) -> Option<ReconcileOutcome> {
        let handle = self.reconciliation.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(error) => {
                tracing::warn!(%error, "background refresh task failed");
                Some(ReconcileOutcome::Failed)
            }
        }
    }
}

/// Editing session behind the admin page
///
/// Loads with the remote store first regardless of context, and never runs
/// a background refresh: the editor's own writes are authoritative.
pub struct EditorSession {
    store: RecordStore,
    writer: PersistenceWriter,
    tier: Tier,
}

impl EditorSession {
    /// Resolve the records to edit
    pub async fn open(backends: &Backends) -> Self {
        let store = RecordStore::new();
        let resolution = backends.resolver(ServingContext::Public).resolve().await;
        store.adopt(resolution.records);
        Self {
            store,
            writer: backends.writer(),
            tier: resolution.tier,
        }
    }

    /// Tier the records came from
    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Shared store
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Entries sorted by descending points, as listed in the editor
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        self.store
            .with_set(|set| sorted_entries(set).into_iter().cloned().collect())
    }

    /// Entry at a 1-based position of [`EditorSession::entries`]
    #[must_use]
    pub fn entry_at_rank(&self, rank: usize) -> Option<Entry> {
        rank.checked_sub(1)
            .and_then(|index| self.entries().into_iter().nth(index))
    }

    /// Members of one area, sorted by descending points
    #[must_use]
    pub fn area_members(&self, area: &str) -> Vec<Record> {
        self.store.with_set(|set| {
            members_of_area(set.records(), area)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Add a record from form input and save
    ///
    /// # Errors
    /// `SyncError::Edit` if the draft is invalid (nothing is changed);
    /// `SyncError::Cache` if saving without a remote store fails.
    pub async fn add(&self, draft: RecordDraft) -> SyncResult<(RecordId, SaveOutcome)> {
        let record = draft.into_record()?;
        let (id, _) = self.store.mutate(|set| Ok(set.push(record)))?;
        tracing::info!(%id, "record added");
        Ok((id, self.persist().await?))
    }

    /// Replace a record from form input and save
    ///
    /// # Errors
    /// `SyncError::Edit` if the draft is invalid or the id unknown.
    pub async fn update(&self, id: RecordId, draft: RecordDraft) -> SyncResult<SaveOutcome> {
        let record = draft.into_record()?;
        self.store.mutate(|set| set.replace(id, record))?;
        tracing::info!(%id, "record updated");
        self.persist().await
    }

    /// Remove a record and save
    ///
    /// # Errors
    /// `SyncError::Edit` if the id is unknown.
    pub async fn remove(&self, id: RecordId) -> SyncResult<(Record, SaveOutcome)> {
        let (removed, _) = self.store.mutate(|set| set.remove(id))?;
        tracing::info!(%id, name = %removed.name, "record removed");
        Ok((removed, self.persist().await?))
    }

    /// Replace every record with the contents of a people CSV and save
    ///
    /// # Errors
    /// `SyncError::Import` if the CSV is malformed; the records are left
    /// untouched.
    pub async fn import_csv(&self, text: &str) -> SyncResult<(usize, SaveOutcome)> {
        let records = csv::decode(text)?;
        let count = records.len();
        self.store.adopt(records);
        tracing::info!(count, "records imported from CSV");
        Ok((count, self.persist().await?))
    }

    /// People CSV of the current records
    #[must_use]
    pub fn export_people_csv(&self) -> String {
        encode_people(&self.store.records())
    }

    /// Areas CSV of the current records
    #[must_use]
    pub fn export_areas_csv(&self) -> String {
        self.store
            .with_set(|set| encode_areas(&aggregate_by_area(set.records())))
    }

    /// Save the current records
    ///
    /// # Errors
    /// `SyncError::Cache` if saving without a remote store fails.
    pub async fn persist(&self) -> SyncResult<SaveOutcome> {
        let records = self.store.records();
        self.writer.save(&records).await.map_err(SyncError::from)
    }
}
