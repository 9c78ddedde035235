use pretty_assertions::assert_eq;
use ranking_core::{Record, RecordDraft};
use ranking_sync::store::load_cached_records;
use ranking_sync::{
    Backends, EditorSession, MemoryCache, PersistenceWriter, ReconcileOutcome, Reconciler,
    RecordStore, ServingContext, Tier, ViewerSession, RANKING_SLOT,
};
use ranking_test_utils::{
    ranking_payload, record, sample_records, FailingCache, FakeRemote, SaveReply,
};
use std::sync::Arc;

fn cached(records: &[Record]) -> Arc<MemoryCache> {
    let blob = serde_json::to_string(records).unwrap();
    Arc::new(MemoryCache::new().with_slot(RANKING_SLOT, blob))
}

// ---------- Reconciler ----------

#[tokio::test]
async fn test_reconcile_discards_remote_after_local_edit() {
    let store = RecordStore::new();
    store.adopt(vec![record("Ana", "Ops", 1)]);

    let (remote, gate) = FakeRemote::serving(&sample_records(3)).gated();
    let remote = Arc::new(remote);
    let cache = Arc::new(MemoryCache::new());
    let pass = Reconciler::new(remote.clone(), cache.clone(), store.clone()).spawn();

    while remote.fetch_calls() == 0 {
        tokio::task::yield_now().await;
    }
    store
        .mutate(|set| Ok(set.push(record("Luis", "Ops", 9))))
        .unwrap();
    gate.notify_one();

    assert_eq!(pass.await.unwrap(), ReconcileOutcome::Stale);
    let names: Vec<String> = store.records().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Ana", "Luis"]);
    assert_eq!(cache.get(RANKING_SLOT), None);
}

#[tokio::test]
async fn test_reconcile_applies_and_notifies() {
    let store = RecordStore::new();
    store.adopt(vec![record("Ana", "Ops", 1)]);
    let changes = store.subscribe();

    let server = sample_records(2);
    let cache = Arc::new(MemoryCache::new());
    let outcome = Reconciler::new(Arc::new(FakeRemote::serving(&server)), cache.clone(), store.clone())
        .run()
        .await;

    assert_eq!(outcome, ReconcileOutcome::Applied(2));
    assert!(changes.has_changed().unwrap());
    assert_eq!(store.records(), server);
    assert_eq!(load_cached_records(cache.as_ref()).await.unwrap(), server);
}

// ---------- Persistence writer ----------

#[tokio::test]
async fn test_remote_save_success_mirrors_cache() {
    let remote = Arc::new(FakeRemote::default().with_save(SaveReply::Accept("Guardado".into())));
    let cache = Arc::new(MemoryCache::new());
    let writer = PersistenceWriter::new(ServingContext::Public, cache.clone()).with_remote(remote.clone());
    let records = sample_records(3);

    let outcome = writer.save(&records).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.message, "Guardado");
    assert!(outcome.surface);
    assert_eq!(remote.saved(), vec![records.clone()]);
    assert_eq!(load_cached_records(cache.as_ref()).await.unwrap(), records);
}

#[tokio::test]
async fn test_remote_save_failure_still_mirrors_cache() {
    for (context, surface) in [(ServingContext::Public, true), (ServingContext::Local, false)] {
        let remote = Arc::new(
            FakeRemote::default().with_save(SaveReply::Status(500, "disk full".to_string())),
        );
        let cache = Arc::new(MemoryCache::new());
        let writer = PersistenceWriter::new(context, cache.clone()).with_remote(remote);
        let records = vec![record("Ana", "Ops", 3)];

        let outcome = writer.save(&records).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.contains("500"));
        assert!(outcome.message.contains("disk full"));
        assert_eq!(outcome.surface, surface);
        assert_eq!(load_cached_records(cache.as_ref()).await.unwrap(), records);
    }
}

#[tokio::test]
async fn test_cache_failure_only_fails_without_remote() {
    let records = vec![record("Ana", "Ops", 3)];

    let cache_only = PersistenceWriter::new(ServingContext::Local, Arc::new(FailingCache));
    assert!(cache_only.save(&records).await.is_err());

    let with_remote = PersistenceWriter::new(ServingContext::Local, Arc::new(FailingCache))
        .with_remote(Arc::new(FakeRemote::default()));
    assert!(with_remote.save(&records).await.unwrap().success);
}

// ---------- Sessions ----------

#[tokio::test]
async fn test_viewer_refreshes_cache_served_session() {
    let server = sample_records(12);
    let remote = Arc::new(FakeRemote::serving(&server));
    let backends = Backends::new(ServingContext::Local, cached(&[record("Viejo", "X", 1)]))
        .with_remote(remote);

    let mut viewer = ViewerSession::open(&backends).await;
    assert_eq!(viewer.tier(), Tier::LocalCache);

    assert!(matches!(
        viewer.wait_reconciliation().await,
        Some(ReconcileOutcome::Applied(_))
    ));
    let view = viewer.people_view();
    assert_eq!(view.visible_count, 12);
    assert_eq!(view.rows.len(), 10);
    assert!(viewer.next_page());
    assert_eq!(viewer.people_view().rows[0].rank, 11);

    assert!(viewer.set_people_filter("persona 1"));
    let view = viewer.people_view();
    assert_eq!(view.page, 1);
    assert_eq!(view.visible_count, 3);
}

#[tokio::test]
async fn test_viewer_from_remote_skips_reconciliation() {
    let remote = Arc::new(FakeRemote::serving(&sample_records(2)));
    let backends =
        Backends::new(ServingContext::Public, Arc::new(MemoryCache::new())).with_remote(remote.clone());
    let mut viewer = ViewerSession::open(&backends).await;
    assert_eq!(viewer.tier(), Tier::Remote);
    assert!(viewer.wait_reconciliation().await.is_none());
    assert_eq!(remote.fetch_calls(), 1);
}

#[tokio::test]
async fn test_editor_keeps_edit_when_server_rejects() {
    let remote = Arc::new(
        FakeRemote::serving(&sample_records(2)).with_save(SaveReply::Transport("timeout".into())),
    );
    let cache = Arc::new(MemoryCache::new());
    let backends = Backends::new(ServingContext::Public, cache.clone()).with_remote(remote.clone());
    let editor = EditorSession::open(&backends).await;
    assert_eq!(editor.tier(), Tier::Remote);

    let (id, outcome) = editor
        .add(RecordDraft::new("Nueva", "Ventas", "Jefa", "999"))
        .await
        .unwrap();
    assert!(!outcome.success);
    assert!(outcome.surface);
    assert!(editor.store().with_set(|set| set.get(id).is_some()));

    let cached = load_cached_records(cache.as_ref()).await.unwrap();
    assert_eq!(cached.len(), 3);
    assert_eq!(cached[2].name, "Nueva");
    assert_eq!(remote.saved().len(), 1);
}

#[tokio::test]
async fn test_editor_import_replaces_everything() {
    let remote = Arc::new(FakeRemote::serving(&sample_records(5)));
    let backends =
        Backends::new(ServingContext::Local, Arc::new(MemoryCache::new())).with_remote(remote.clone());
    let editor = EditorSession::open(&backends).await;

    let csv = "Nombre;Área;Cargo;Puntos\n\"Eva\";\"QA\";\"Tester\";\"40\"\n\"Iván\";\"QA\";\"\";\"60\"";
    let (count, outcome) = editor.import_csv(csv).await.unwrap();
    assert_eq!(count, 2);
    assert!(outcome.success);
    assert_eq!(
        remote.saved().last().cloned(),
        Some(vec![
            Record::new("Eva", "QA", "Tester", 40),
            Record::new("Iván", "QA", "", 60),
        ])
    );
    assert_eq!(editor.entry_at_rank(1).map(|e| e.record.name), Some("Iván".to_string()));
    assert_eq!(
        editor.export_areas_csv(),
        "Área;Puntos Totales;Cantidad de Colaboradores\n\"QA\";\"100\";\"2\""
    );
}

#[tokio::test]
async fn test_payload_helper_matches_wire_format() {
    let payload = ranking_payload(&[record("Ana", "Ops", 2)]);
    assert_eq!(payload["ranking"][0]["nombre"], "Ana");
    assert_eq!(payload["ranking"][0]["puntos"], 2);
}
