//! View models for the people and area rankings
//!
//! Building a view is a pure function of a [`RecordSet`] and a view state.
//! The state objects own the filter text and the current page; everything
//! else (sorting, filtering, ranks, highlight spans, empty-state messages) is
//! recomputed on every build.

use crate::aggregate::{aggregate_by_area, AreaAggregate};
use crate::highlight::locate_matches;
use crate::normalize::normalize;
use crate::record::{Entry, Record, RecordId, RecordSet};
use std::ops::Range;

/// Rows per page in the people view
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Trophy shown next to the first five positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Podium {
    /// First place
    Gold,
    /// Second place
    Silver,
    /// Third place
    Bronze,
    /// Fourth and fifth place
    Trophy,
    /// Everyone else
    None,
}

impl Podium {
    /// Podium marker for a 1-based rank
    #[must_use]
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => Self::Gold,
            2 => Self::Silver,
            3 => Self::Bronze,
            4 | 5 => Self::Trophy,
            _ => Self::None,
        }
    }

    /// Emoji for the marker, empty for [`Podium::None`]
    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Gold => "🥇",
            Self::Silver => "🥈",
            Self::Bronze => "🥉",
            Self::Trophy => "🏆",
            Self::None => "",
        }
    }

    /// Style class of the position cell (top three only)
    #[must_use]
    pub fn class(self) -> Option<&'static str> {
        match self {
            Self::Gold => Some("top-1"),
            Self::Silver => Some("top-2"),
            Self::Bronze => Some("top-3"),
            Self::Trophy | Self::None => None,
        }
    }
}

/// Message shown instead of rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The record set itself is empty
    NoData,
    /// A people filter matched nothing
    NoMatches,
    /// An area filter matched nothing
    NoAreaMatches,
}

impl EmptyState {
    /// User-facing text
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::NoData => "No hay datos disponibles",
            Self::NoMatches => "No se encontraron resultados",
            Self::NoAreaMatches => "No se encontraron áreas",
        }
    }
}

impl std::fmt::Display for EmptyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result count label, e.g. `"1 resultado"` or `"12 resultados"`
#[must_use]
pub fn results_label(count: usize) -> String {
    if count == 1 {
        "1 resultado".to_string()
    } else {
        format!("{count} resultados")
    }
}

/// Page controls, present only when the visible rows exceed one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page, 1-based
    pub page: usize,
    /// Number of pages
    pub total_pages: usize,
    /// Whether a previous page exists
    pub has_prev: bool,
    /// Whether a next page exists
    pub has_next: bool,
}

impl Pagination {
    /// Page indicator text
    #[must_use]
    pub fn label(&self) -> String {
        format!("Página {} de {}", self.page, self.total_pages)
    }
}

/// One row of the people view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    /// Id of the underlying record
    pub id: RecordId,
    /// Position in the filtered, sorted list (1-based, global across pages)
    pub rank: usize,
    /// Trophy marker
    pub podium: Podium,
    /// Record contents
    pub record: Record,
    /// Whether a filter is active
    pub matched: bool,
    /// Filter matches in the name
    pub name_spans: Vec<Range<usize>>,
    /// Filter matches in the area
    pub area_spans: Vec<Range<usize>>,
    /// Filter matches in the role
    pub role_spans: Vec<Range<usize>>,
}

/// The people ranking as rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleView {
    /// Rows of the current page
    pub rows: Vec<PersonRow>,
    /// Rows matching the filter across all pages
    pub visible_count: usize,
    /// Current page, 1-based
    pub page: usize,
    /// Number of pages, 0 when nothing is visible
    pub total_pages: usize,
    /// Page controls
    pub pagination: Option<Pagination>,
    /// Set when there are no rows
    pub empty: Option<EmptyState>,
}

impl PeopleView {
    /// Result count label for this view
    #[must_use]
    pub fn results_label(&self) -> String {
        results_label(self.visible_count)
    }
}

/// Filter and page of the people view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleViewState {
    filter: String,
    normalized: String,
    page: usize,
    page_size: usize,
}

impl Default for PeopleViewState {
    fn default() -> Self {
        Self {
            filter: String::new(),
            normalized: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PeopleViewState {
    /// Create state on page 1 with no filter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set rows per page (at least 1)
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Raw filter text
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Normalized, trimmed filter used for matching
    #[must_use]
    pub fn normalized_filter(&self) -> &str {
        &self.normalized
    }

    /// Current page, 1-based
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Update the filter text
    ///
    /// Returns whether the text changed; a change resets the page to 1.
    pub fn set_filter(&mut self, filter: impl Into<String>) -> bool {
        let filter = filter.into();
        if filter == self.filter {
            return false;
        }
        self.normalized = normalize(filter.trim());
        self.filter = filter;
        self.page = 1;
        true
    }

    /// Number of records the current filter lets through
    #[must_use]
    pub fn visible_count(&self, set: &RecordSet) -> usize {
        set.records().filter(|r| self.matches(r)).count()
    }

    /// Number of pages for the current filter
    #[must_use]
    pub fn total_pages(&self, set: &RecordSet) -> usize {
        self.visible_count(set).div_ceil(self.page_size)
    }

    /// Jump to a page; out-of-range pages are ignored
    ///
    /// Returns whether the page was accepted.
    pub fn go_to_page(&mut self, page: usize, set: &RecordSet) -> bool {
        if page >= 1 && page <= self.total_pages(set) {
            self.page = page;
            true
        } else {
            false
        }
    }

    /// Advance one page if possible
    pub fn next_page(&mut self, set: &RecordSet) -> bool {
        self.go_to_page(self.page + 1, set)
    }

    /// Go back one page if possible
    pub fn prev_page(&mut self, set: &RecordSet) -> bool {
        self.page > 1 && self.go_to_page(self.page - 1, set)
    }

    /// Build the view for `set`
    ///
    /// A page left beyond the last one (after records were removed) is
    /// clamped to the last page.
    #[must_use]
    pub fn build(&self, set: &RecordSet) -> PeopleView {
        let visible: Vec<&Entry> = sorted_entries(set)
            .into_iter()
            .filter(|e| self.matches(&e.record))
            .collect();

        let visible_count = visible.len();
        let total_pages = visible_count.div_ceil(self.page_size);
        let page = self.page.clamp(1, total_pages.max(1));
        let offset = (page - 1) * self.page_size;
        let matched = !self.normalized.is_empty();

        let rows = visible
            .into_iter()
            .enumerate()
            .skip(offset)
            .take(self.page_size)
            .map(|(index, entry)| {
                let rank = index + 1;
                PersonRow {
                    id: entry.id,
                    rank,
                    podium: Podium::for_rank(rank),
                    record: entry.record.clone(),
                    matched,
                    name_spans: locate_matches(&entry.record.name, &self.normalized),
                    area_spans: locate_matches(&entry.record.area, &self.normalized),
                    role_spans: locate_matches(&entry.record.role, &self.normalized),
                }
            })
            .collect();

        let pagination = (visible_count > self.page_size).then_some(Pagination {
            page,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
        });

        PeopleView {
            rows,
            visible_count,
            page,
            total_pages,
            pagination,
            empty: empty_state(visible_count, matched, EmptyState::NoMatches),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        self.normalized.is_empty() || normalize(&record.search_text()).contains(&self.normalized)
    }
}

/// One row of the area view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRow {
    /// Position in the filtered list (1-based)
    pub rank: usize,
    /// Trophy marker
    pub podium: Podium,
    /// Area totals
    pub aggregate: AreaAggregate,
    /// Whether a filter is active
    pub matched: bool,
    /// Filter matches in the area name
    pub area_spans: Vec<Range<usize>>,
}

/// The area ranking as rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaView {
    /// All matching areas
    pub rows: Vec<AreaRow>,
    /// Number of rows
    pub visible_count: usize,
    /// Set when there are no rows
    pub empty: Option<EmptyState>,
}

impl AreaView {
    /// Result count label for this view
    #[must_use]
    pub fn results_label(&self) -> String {
        results_label(self.visible_count)
    }
}

/// Filter of the area view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaViewState {
    filter: String,
    normalized: String,
}

impl AreaViewState {
    /// Create state with no filter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw filter text
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Update the filter text, returning whether it changed
    pub fn set_filter(&mut self, filter: impl Into<String>) -> bool {
        let filter = filter.into();
        if filter == self.filter {
            return false;
        }
        self.normalized = normalize(filter.trim());
        self.filter = filter;
        true
    }

    /// Build the view for `set`
    #[must_use]
    pub fn build(&self, set: &RecordSet) -> AreaView {
        let matched = !self.normalized.is_empty();
        let rows: Vec<AreaRow> = aggregate_by_area(set.records())
            .into_iter()
            .filter(|a| !matched || normalize(&a.area).contains(&self.normalized))
            .enumerate()
            .map(|(index, aggregate)| AreaRow {
                rank: index + 1,
                podium: Podium::for_rank(index + 1),
                area_spans: locate_matches(&aggregate.area, &self.normalized),
                aggregate,
                matched,
            })
            .collect();

        let visible_count = rows.len();
        AreaView {
            rows,
            visible_count,
            empty: empty_state(visible_count, matched, EmptyState::NoAreaMatches),
        }
    }
}

/// Entries sorted by descending points; ties keep insertion order
#[must_use]
pub fn sorted_entries(set: &RecordSet) -> Vec<&Entry> {
    let mut entries: Vec<&Entry> = set.entries().collect();
    entries.sort_by(|a, b| b.record.points.cmp(&a.record.points));
    entries
}

fn empty_state(visible: usize, filtered: bool, no_match: EmptyState) -> Option<EmptyState> {
    match (visible, filtered) {
        (0, true) => Some(no_match),
        (0, false) => Some(EmptyState::NoData),
        _ => None,
    }
}
