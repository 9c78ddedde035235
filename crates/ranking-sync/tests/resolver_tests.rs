use pretty_assertions::assert_eq;
use ranking_core::{default_records, Record};
use ranking_sync::store::mirror_records;
use ranking_sync::{MemoryCache, Resolver, ServingContext, Tier, RANKING_SLOT};
use ranking_test_utils::{record, sample_records, FailingCache, FakeRemote, FakeSnapshot};
use serde_json::json;
use std::sync::Arc;

fn cached(records: &[Record]) -> Arc<MemoryCache> {
    let blob = serde_json::to_string(records).unwrap();
    Arc::new(MemoryCache::new().with_slot(RANKING_SLOT, blob))
}

fn cached_records(cache: &MemoryCache) -> Option<Vec<Record>> {
    cache
        .get(RANKING_SLOT)
        .map(|blob| serde_json::from_str(&blob).unwrap())
}

#[tokio::test]
async fn test_public_prefers_remote_and_mirrors() {
    let server = sample_records(4);
    let remote = Arc::new(FakeRemote::serving(&server));
    let snapshot = Arc::new(FakeSnapshot::serving(&sample_records(1)));
    let cache = cached(&[record("Viejo", "X", 1)]);

    let resolution = Resolver::new(ServingContext::Public, cache.clone())
        .with_remote(remote.clone())
        .with_snapshot(snapshot.clone())
        .resolve()
        .await;

    assert_eq!(resolution.tier, Tier::Remote);
    assert_eq!(resolution.records, server);
    assert!(!resolution.reconcile);
    assert_eq!(cached_records(&cache), Some(server));
    assert_eq!(snapshot.calls(), 0);
}

#[tokio::test]
async fn test_public_empty_remote_falls_back_to_cache() {
    let remote = Arc::new(FakeRemote::serving(&[]));
    let local = vec![record("Ana", "Ops", 5)];
    let cache = cached(&local);

    let resolution = Resolver::new(ServingContext::Public, cache.clone())
        .with_remote(remote)
        .resolve()
        .await;

    assert_eq!(resolution.tier, Tier::LocalCache);
    assert_eq!(resolution.records, local);
    assert!(resolution.reconcile);
}

#[tokio::test]
async fn test_public_invalid_remote_payload_is_a_tier_failure() {
    let remote = Arc::new(FakeRemote::default().with_fetch(Ok(json!({ "ranking": "nope" }))));
    let snapshot = Arc::new(FakeSnapshot::new(Ok(json!([{ "nombre": "Bundled", "puntos": "7" }]))));
    let cache = Arc::new(MemoryCache::new());

    let resolution = Resolver::new(ServingContext::Public, cache.clone())
        .with_remote(remote)
        .with_snapshot(snapshot)
        .resolve()
        .await;

    assert_eq!(resolution.tier, Tier::Snapshot);
    assert_eq!(resolution.records, vec![Record::new("Bundled", "", "", 7)]);
    assert_eq!(cached_records(&cache), Some(resolution.records.clone()));
}

#[tokio::test]
async fn test_local_prefers_cache_without_touching_remote() {
    let remote = Arc::new(FakeRemote::serving(&sample_records(2)));
    let local = vec![record("Ana", "Ops", 5), record("Luis", "Ops", 3)];
    let cache = cached(&local);

    let resolution = Resolver::new(ServingContext::Local, cache)
        .with_remote(remote.clone())
        .resolve()
        .await;

    assert_eq!(resolution.tier, Tier::LocalCache);
    assert_eq!(resolution.records, local);
    assert!(resolution.reconcile);
    assert_eq!(remote.fetch_calls(), 0);
}

#[tokio::test]
async fn test_local_accepts_empty_remote_list() {
    let remote = Arc::new(FakeRemote::serving(&[]));
    let cache = Arc::new(MemoryCache::new());

    let resolution = Resolver::new(ServingContext::Local, cache.clone())
        .with_remote(remote)
        .resolve()
        .await;

    assert_eq!(resolution.tier, Tier::Remote);
    assert!(resolution.records.is_empty());
    assert_eq!(cache.get(RANKING_SLOT).as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_empty_cache_counts_as_failure() {
    let cache = Arc::new(MemoryCache::new());
    mirror_records(cache.as_ref(), &[]).await.unwrap();
    let snapshot = Arc::new(FakeSnapshot::serving(&sample_records(2)));

    let resolution = Resolver::new(ServingContext::Local, cache)
        .with_snapshot(snapshot)
        .resolve()
        .await;

    assert_eq!(resolution.tier, Tier::Snapshot);
    assert!(!resolution.reconcile);
}

#[tokio::test]
async fn test_everything_failing_yields_defaults() {
    let remote = Arc::new(FakeRemote::offline());
    let snapshot = Arc::new(FakeSnapshot::new(Ok(json!({ "other": [] }))));
    let cache = Arc::new(MemoryCache::new());

    for context in [ServingContext::Public, ServingContext::Local] {
        let resolution = Resolver::new(context, cache.clone())
            .with_remote(remote.clone())
            .with_snapshot(snapshot.clone())
            .resolve()
            .await;
        assert_eq!(resolution.tier, Tier::Defaults);
        assert_eq!(resolution.records, default_records());
    }
    assert_eq!(cache.get(RANKING_SLOT), None);
}

#[tokio::test]
async fn test_unreadable_cache_is_skipped() {
    let snapshot = Arc::new(FakeSnapshot::serving(&sample_records(3)));
    let resolution = Resolver::new(ServingContext::Local, Arc::new(FailingCache))
        .with_snapshot(snapshot)
        .resolve()
        .await;
    assert_eq!(resolution.tier, Tier::Snapshot);
    assert_eq!(resolution.records.len(), 3);
}

#[tokio::test]
async fn test_remote_records_are_coerced() {
    let remote = Arc::new(FakeRemote::default().with_fetch(Ok(json!({
        "ranking": [
            { "nombre": "  Ana ", "puntos": "12.5" },
            "garbage",
            { "area": "Ops", "puntos": -3 }
        ]
    }))));
    let resolution = Resolver::new(ServingContext::Public, Arc::new(MemoryCache::new()))
        .with_remote(remote)
        .resolve()
        .await;

    assert_eq!(
        resolution.records,
        vec![
            Record::new("Ana", "", "", 12),
            Record::new("", "Ops", "", 0),
        ]
    );
}
