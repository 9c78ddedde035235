//! Ranking Sync
//!
//! The async half of the ranking engine:
//! - Resolves a session's records from remote, cache, snapshot or defaults
//! - Refreshes cache-served sessions from the remote in the background
//! - Persists edits to the remote store and mirrors them locally
//!
//! # Example
//!
//! ```rust,ignore
//! use ranking_sync::{Backends, RankingConfig, ViewerSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RankingConfig::from_env()?;
//! let backends = Backends::from_config(&config)?;
//!
//! let mut viewer = ViewerSession::open(&backends).await;
//! viewer.set_people_filter("gonzalez");
//! println!("{}", viewer.people_view().results_label());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod accounts;
pub mod config;
pub mod debounce;
pub mod error;
pub mod reconciler;
pub mod resolver;
pub mod session;
pub mod state;
pub mod store;
pub mod writer;

pub use accounts::{load_accounts, save_accounts, EditorAccount, ACCOUNTS_SLOT};
pub use config::{RankingConfig, ServingContext, SnapshotLocation};
pub use debounce::Debouncer;
pub use error::{CacheError, ConfigError, PersistenceError, SourceError, SyncError, SyncResult};
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use resolver::{first_success, Resolution, Resolver, Tier};
pub use session::{Backends, EditorSession, ViewerSession};
pub use state::{RecordStore, SwapOutcome};
pub use store::{
    FileCache, FileSnapshot, HttpRemoteStore, HttpSnapshot, LocalCache, MemoryCache,
    RemoteStore, SaveReceipt, SnapshotSource, RANKING_SLOT,
};
pub use writer::{PersistenceWriter, SaveOutcome};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running ranking sessions
    pub use crate::{
        Backends, EditorSession, RankingConfig, ServingContext, Tier, ViewerSession,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
