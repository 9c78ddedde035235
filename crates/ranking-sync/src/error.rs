//! Error types for the sync layer
//!
//! One enum per concern:
//! - Source failures (a resolution tier could not produce records)
//! - Local cache I/O
//! - Remote persistence
//! - Configuration loading

use ranking_core::{EditError, ImportError, PayloadError};
use std::path::PathBuf;

/// A data source failed to produce records
///
/// Never fatal on its own: the resolver moves on to the next tier.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure or non-success HTTP status
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Body is not JSON
    #[error("malformed response: {0}")]
    Malformed(String),

    /// JSON of the wrong shape
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    /// Valid but empty where records are required
    #[error("source returned no records")]
    Empty,

    /// Nothing stored in the slot
    #[error("nothing stored in cache slot `{0}`")]
    Missing(String),

    /// Cache could not be read
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Local cache failures
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filesystem error
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Value could not be (de)serialized
    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Slot name unusable as a storage key
    #[error("invalid cache slot `{0}`")]
    InvalidSlot(String),

    /// Background task failed
    #[error("cache task failed: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wrap an I/O error with the path it concerns
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Remote write failures
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Server answered with a non-success status
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Request never completed
    #[error("transport error: {0}")]
    Transport(String),

    /// Success status but unreadable body
    #[error("invalid server response: {0}")]
    InvalidResponse(String),

    /// Server reported `success: false`
    #[error("save rejected: {0}")]
    Rejected(String),
}

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Unknown serving context name
    #[error("unknown serving context `{0}` (expected `public` or `local`)")]
    InvalidContext(String),
}

/// Combined sync error
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Import(#[from] ImportError),
}

impl SyncError {
    /// Whether the error came from user input rather than a backend
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Edit(_) | Self::Import(_))
    }
}

/// Result type alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
