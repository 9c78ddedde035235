//! Ranking Core
//!
//! Pure, synchronous building blocks of the ranking engine. Nothing in this
//! crate performs I/O; the async resolution and persistence layer lives in
//! `ranking-sync`.
//!
//! # Components
//!
//! - [`normalize`]: diacritic- and case-folded search keys
//! - [`highlight`]: locating filter matches in original text and wrapping them in markers
//! - [`csv`]: the quoted, semicolon-delimited interchange format
//! - [`aggregate`]: per-area totals
//! - [`view`]: sorted, filtered, paginated view models
//!
//! # Data flow
//!
//! ```text
//! payload ──validate──▶ RecordSet ──view::PeopleViewState::build──▶ PeopleView
//!                          │
//!                          └──aggregate_by_area──▶ AreaView
//! ```
//!
//! # Example
//!
//! ```rust
//! use ranking_core::{PeopleViewState, Record, RecordSet};
//!
//! let set = RecordSet::from_records(vec![
//!     Record::new("Ana", "Marketing", "Lead", 10),
//!     Record::new("José", "Tecnología", "CTO", 30),
//! ]);
//!
//! let mut state = PeopleViewState::new();
//! state.set_filter("jose");
//! let view = state.build(&set);
//! assert_eq!(view.visible_count, 1);
//! assert_eq!(view.rows[0].rank, 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod aggregate;
pub mod csv;
pub mod error;
pub mod highlight;
pub mod normalize;
pub mod record;
pub mod view;

pub use aggregate::{aggregate_by_area, members_of_area, AreaAggregate};
pub use error::{CoreError, EditError, ImportError, PayloadError};
pub use highlight::{highlight, locate_matches, Highlighter};
pub use normalize::normalize;
pub use record::{
    default_records, ranking_from_document, ranking_from_envelope, validate_records, Entry,
    Record, RecordDraft, RecordId, RecordSet, NO_AREA, UNNAMED,
};
pub use view::{
    results_label, AreaRow, AreaView, AreaViewState, EmptyState, Pagination, PeopleView,
    PeopleViewState, PersonRow, Podium, DEFAULT_PAGE_SIZE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building ranking views
    pub use crate::aggregate::{aggregate_by_area, AreaAggregate};
    pub use crate::error::{EditError, ImportError};
    pub use crate::normalize::normalize;
    pub use crate::record::{Record, RecordId, RecordSet};
    pub use crate::view::{AreaViewState, PeopleViewState};
}
