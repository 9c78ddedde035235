//! HTTP remote store and snapshot
//!
//! Endpoints, relative to the API base:
//! - `GET /api/ranking` returns `{ "ranking": [...] }`
//! - `POST /api/ranking/save` takes `{ "data": [...] }` and answers with a
//!   [`SaveReceipt`]

use super::{RemoteStore, SaveReceipt, SnapshotSource};
use crate::error::{PersistenceError, SourceError};
use async_trait::async_trait;
use ranking_core::Record;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Serialize)]
struct SaveRequest<'a> {
    data: &'a [Record],
}

fn build_client(timeout: Duration) -> Result<Client, SourceError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::Unavailable(format!("cannot build HTTP client: {e}")))
}

async fn get_json(client: &Client, url: &str) -> Result<Value, SourceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Unavailable(format!("{url} returned {status}")));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| SourceError::Malformed(e.to_string()))
}

/// Remote store reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base: String,
}

impl HttpRemoteStore {
    /// Create a store for `base` (e.g. `http://localhost:8000`)
    ///
    /// # Errors
    /// `SourceError::Unavailable` if the HTTP client cannot be built.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self::with_client(build_client(timeout)?, base))
    }

    /// Create a store sharing an existing client
    #[must_use]
    pub fn with_client(client: Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client, base }
    }

    /// API base URL
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    fn ranking_url(&self) -> String {
        format!("{}/api/ranking", self.base)
    }

    fn save_url(&self) -> String {
        format!("{}/api/ranking/save", self.base)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch(&self) -> Result<Value, SourceError> {
        tracing::debug!(url = %self.ranking_url(), "fetching remote ranking");
        get_json(&self.client, &self.ranking_url()).await
    }

    async fn save(&self, records: &[Record]) -> Result<SaveReceipt, PersistenceError> {
        let url = self.save_url();
        tracing::debug!(%url, count = records.len(), "posting ranking");

        let response = self
            .client
            .post(&url)
            .json(&SaveRequest { data: records })
            .send()
            .await
            .map_err(|e| PersistenceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let receipt: SaveReceipt = response
            .json()
            .await
            .map_err(|e| PersistenceError::InvalidResponse(e.to_string()))?;
        if !receipt.success {
            return Err(PersistenceError::Rejected(receipt.message));
        }
        Ok(receipt)
    }
}

/// Snapshot document served over HTTP
///
/// Every fetch appends a `nocache=<millis>` query parameter so that
/// intermediaries never serve a stale copy.
#[derive(Debug, Clone)]
pub struct HttpSnapshot {
    client: Client,
    url: String,
}

impl HttpSnapshot {
    /// Create a snapshot source for `url`
    ///
    /// # Errors
    /// `SourceError::Unavailable` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
        })
    }

    fn cache_busted_url(&self, millis: i64) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}nocache={millis}", self.url)
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshot {
    async fn fetch(&self) -> Result<Value, SourceError> {
        let url = self.cache_busted_url(chrono::Utc::now().timestamp_millis());
        tracing::debug!(%url, "fetching bundled snapshot");
        get_json(&self.client, &url).await
    }
}
