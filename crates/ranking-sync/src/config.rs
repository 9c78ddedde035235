//! Runtime configuration
//!
//! Loaded from TOML, then adjusted from the environment:
//!
//! ```toml
//! context = "public"
//! remote_server_url = "https://ranking.example.com"
//! snapshot = "assets/data/ranking.json"
//! cache_dir = ".ranking-cache"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default address of the development server
pub const DEFAULT_LOCAL_SERVER_URL: &str = "http://localhost:8000";

/// Default location of the bundled snapshot
pub const DEFAULT_SNAPSHOT: &str = "assets/data/ranking.json";

/// Environment variable overriding the API base URL
pub const ENV_API_BASE: &str = "RANKING_API_BASE";

/// Environment variable overriding the serving context
pub const ENV_CONTEXT: &str = "RANKING_CONTEXT";

/// Where the application is being served from
///
/// Decides the resolver's tier order and whether save failures are surfaced
/// to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServingContext {
    /// Deployed; the remote store is authoritative
    Public,
    /// Development machine or LAN
    #[default]
    Local,
}

impl ServingContext {
    /// Classify a host name: loopback and `192.168.*` are local
    #[must_use]
    pub fn detect(host: &str) -> Self {
        let host = host.trim();
        if host == "localhost" || host == "127.0.0.1" || host.starts_with("192.168.") {
            Self::Local
        } else {
            Self::Public
        }
    }

    /// Whether this is the public context
    #[inline]
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

impl FromStr for ServingContext {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "local" => Ok(Self::Local),
            other => Err(ConfigError::InvalidContext(other.to_string())),
        }
    }
}

impl std::fmt::Display for ServingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Public => "public",
            Self::Local => "local",
        })
    }
}

/// Location of the bundled snapshot document
///
/// Written in config as a plain string; `http://` and `https://` values are
/// URLs, anything else a file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SnapshotLocation {
    /// File on disk
    File(PathBuf),
    /// HTTP resource
    Url(String),
}

impl From<String> for SnapshotLocation {
    fn from(value: String) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value)
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

impl From<SnapshotLocation> for String {
    fn from(value: SnapshotLocation) -> Self {
        match value {
            SnapshotLocation::File(path) => path.display().to_string(),
            SnapshotLocation::Url(url) => url,
        }
    }
}

impl Default for SnapshotLocation {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_SNAPSHOT))
    }
}

/// Ranking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Explicit serving context
    pub context: Option<ServingContext>,
    /// Host name used to detect the context when none is given
    pub host: Option<String>,
    /// Whether a remote store is used at all
    pub use_api: bool,
    /// Always talk to the local server, whatever the context
    pub use_local_server: bool,
    /// Local server base URL
    pub local_server_url: String,
    /// Public server base URL
    pub remote_server_url: Option<String>,
    /// Explicit API base, bypassing the selection rules
    pub api_base: Option<String>,
    /// Bundled snapshot
    pub snapshot: SnapshotLocation,
    /// Directory of the local cache
    pub cache_dir: PathBuf,
    /// Rows per page in the people view
    pub page_size: usize,
    /// Search input quiet period in milliseconds
    pub debounce_ms: u64,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            context: None,
            host: None,
            use_api: true,
            use_local_server: false,
            local_server_url: DEFAULT_LOCAL_SERVER_URL.to_string(),
            remote_server_url: None,
            api_base: None,
            snapshot: SnapshotLocation::default(),
            cache_dir: PathBuf::from(".ranking-cache"),
            page_size: ranking_core::DEFAULT_PAGE_SIZE,
            debounce_ms: 300,
            request_timeout_secs: 10,
        }
    }
}

impl RankingConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` on invalid TOML or unknown values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// `ConfigError::Read` if the file cannot be read, `ConfigError::Parse`
    /// if it is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults adjusted from the process environment
    ///
    /// # Errors
    /// `ConfigError::InvalidContext` if `RANKING_CONTEXT` is not recognized.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `RANKING_API_BASE` and `RANKING_CONTEXT` from `lookup`
    ///
    /// # Errors
    /// `ConfigError::InvalidContext` if the context value is not recognized.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            self.api_base = Some(base.trim().to_string());
        }
        if let Some(context) = lookup(ENV_CONTEXT).filter(|v| !v.trim().is_empty()) {
            self.context = Some(context.parse()?);
        }
        Ok(self)
    }

    /// With explicit serving context
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: ServingContext) -> Self {
        self.context = Some(context);
        self
    }

    /// With explicit API base
    #[inline]
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// With public server URL
    #[inline]
    #[must_use]
    pub fn with_remote_server(mut self, url: impl Into<String>) -> Self {
        self.remote_server_url = Some(url.into());
        self
    }

    /// With snapshot location
    #[inline]
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: SnapshotLocation) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// With cache directory
    #[inline]
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Without any remote store
    #[inline]
    #[must_use]
    pub fn without_api(mut self) -> Self {
        self.use_api = false;
        self
    }

    /// Effective serving context
    #[must_use]
    pub fn serving_context(&self) -> ServingContext {
        self.context.unwrap_or_else(|| {
            self.host
                .as_deref()
                .map_or(ServingContext::Local, ServingContext::detect)
        })
    }

    /// Base URL of the remote store, `None` when no remote is used
    ///
    /// `use_local_server` forces the local URL; otherwise the public context
    /// talks to the public server and the local context to the local one.
    #[must_use]
    pub fn api_base(&self) -> Option<String> {
        if !self.use_api {
            return None;
        }
        if let Some(base) = &self.api_base {
            return Some(base.trim_end_matches('/').to_string());
        }
        let base = if self.use_local_server {
            Some(self.local_server_url.as_str())
        } else {
            match self.serving_context() {
                ServingContext::Public => self.remote_server_url.as_deref(),
                ServingContext::Local => Some(self.local_server_url.as_str()),
            }
        };
        base.map(|b| b.trim_end_matches('/').to_string())
    }

    /// HTTP request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Search debounce period
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
