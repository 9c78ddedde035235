//! Testing utilities for the ranking workspace
//!
//! Record fixtures and scriptable in-memory backends.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use ranking_core::Record;
use ranking_sync::{
    CacheError, LocalCache, PersistenceError, RemoteStore, SaveReceipt, SnapshotSource,
    SourceError,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub fn record(name: &str, area: &str, points: u64) -> Record {
    Record::new(name, area, "", points)
}

/// `n` records with distinct names, points descending from `n * 10`
pub fn sample_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let points = u64::try_from((n - i) * 10).unwrap();
            Record::new(format!("Persona {i}"), format!("Área {}", i % 3), "Analista", points)
        })
        .collect()
}

/// `{ "ranking": [...] }` document for `records`
pub fn ranking_payload(records: &[Record]) -> Value {
    json!({ "ranking": records })
}

/// Scripted reply of [`FakeRemote::save`]
#[derive(Debug, Clone)]
pub enum SaveReply {
    Accept(String),
    Status(u16, String),
    Transport(String),
}

/// Remote store whose replies are set by the test
pub struct FakeRemote {
    fetch_reply: Mutex<Result<Value, String>>,
    save_reply: Mutex<SaveReply>,
    gate: Mutex<Option<Arc<Notify>>>,
    fetch_calls: AtomicUsize,
    saved: Mutex<Vec<Vec<Record>>>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self {
            fetch_reply: Mutex::new(Err("offline".to_string())),
            save_reply: Mutex::new(SaveReply::Accept("Datos guardados".to_string())),
            gate: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
            saved: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRemote {
    /// Remote that is unreachable
    pub fn offline() -> Self {
        Self::default()
    }

    /// Remote serving `records`
    pub fn serving(records: &[Record]) -> Self {
        Self::default().with_fetch(Ok(ranking_payload(records)))
    }

    pub fn with_fetch(self, reply: Result<Value, String>) -> Self {
        *self.fetch_reply.lock() = reply;
        self
    }

    pub fn with_save(self, reply: SaveReply) -> Self {
        *self.save_reply.lock() = reply;
        self
    }

    /// Make `fetch` wait until the returned notify is signalled
    pub fn gated(self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn set_fetch(&self, reply: Result<Value, String>) {
        *self.fetch_reply.lock() = reply;
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Every record list passed to `save`, oldest first
    pub fn saved(&self) -> Vec<Vec<Record>> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn fetch(&self) -> Result<Value, SourceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.fetch_reply.lock().clone().map_err(SourceError::Unavailable)
    }

    async fn save(&self, records: &[Record]) -> Result<SaveReceipt, PersistenceError> {
        self.saved.lock().push(records.to_vec());
        let reply = self.save_reply.lock().clone();
        match reply {
            SaveReply::Accept(message) => Ok(SaveReceipt {
                success: true,
                message,
                count: records.len(),
            }),
            SaveReply::Status(status, body) => Err(PersistenceError::Status { status, body }),
            SaveReply::Transport(detail) => Err(PersistenceError::Transport(detail)),
        }
    }
}

/// Snapshot source with a fixed reply
pub struct FakeSnapshot {
    reply: Result<Value, String>,
    calls: AtomicUsize,
}

impl FakeSnapshot {
    pub fn new(reply: Result<Value, String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn serving(records: &[Record]) -> Self {
        Self::new(Ok(ranking_payload(records)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for FakeSnapshot {
    async fn fetch(&self) -> Result<Value, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(SourceError::Unavailable)
    }
}

/// Cache whose every operation fails
#[derive(Debug, Default)]
pub struct FailingCache;

#[async_trait]
impl LocalCache for FailingCache {
    async fn read(&self, _slot: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Internal("cache unavailable".to_string()))
    }

    async fn write(&self, _slot: &str, _blob: &str) -> Result<(), CacheError> {
        Err(CacheError::Internal("cache unavailable".to_string()))
    }
}
