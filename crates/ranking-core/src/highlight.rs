//! Match location and highlighting
//!
//! Matching happens on normalized text, but highlighting must wrap the
//! original text. [`locate_matches`] maps each match in the normalized string
//! back to a byte range of the original by walking it one character at a
//! time.

use crate::normalize::{folded_len, normalize};
use std::ops::Range;

/// Default opening marker
pub const DEFAULT_OPEN: &str = r#"<span class="highlight">"#;

/// Default closing marker
pub const DEFAULT_CLOSE: &str = "</span>";

/// Normalized extent of one source character
#[derive(Debug, Clone)]
struct Segment {
    bytes: Range<usize>,
    start: usize,
    end: usize,
}

impl Segment {
    fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Locate every occurrence of `normalized_filter` in `original`
///
/// Returns byte ranges of `original`, ascending and non-overlapping. A match
/// whose boundaries fall inside the expansion of a single source character
/// is skipped, and the scan resumes one character after its start.
#[must_use]
pub fn locate_matches(original: &str, normalized_filter: &str) -> Vec<Range<usize>> {
    if normalized_filter.is_empty() {
        return Vec::new();
    }

    let normalized = normalize(original);
    if !normalized.contains(normalized_filter) {
        return Vec::new();
    }

    let segments = segments(original);
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(offset) = normalized[from..].find(normalized_filter) {
        let start = from + offset;
        let end = start + normalized_filter.len();
        match map_window(&segments, (start, end)) {
            Some(span) => {
                spans.push(span);
                from = end;
            }
            None => {
                from = start + normalized[start..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    spans
}

/// Wrap matches of `normalized_filter` with the default markers
#[must_use]
pub fn highlight(text: &str, normalized_filter: &str) -> String {
    Highlighter::default().highlight(text, normalized_filter)
}

/// Inserts markers around located matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    open: String,
    close: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN, DEFAULT_CLOSE)
    }
}

impl Highlighter {
    /// Create a highlighter with custom markers
    #[must_use]
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Highlight every match of `normalized_filter` in `text`
    #[must_use]
    pub fn highlight(&self, text: &str, normalized_filter: &str) -> String {
        self.wrap(text, &locate_matches(text, normalized_filter))
    }

    /// Wrap the given byte spans of `text`
    ///
    /// Spans must be ascending, non-overlapping and on char boundaries, as
    /// produced by [`locate_matches`].
    #[must_use]
    pub fn wrap(&self, text: &str, spans: &[Range<usize>]) -> String {
        let mut out = text.to_string();
        for span in spans.iter().rev() {
            out.insert_str(span.end, &self.close);
            out.insert_str(span.start, &self.open);
        }
        out
    }
}

fn segments(original: &str) -> Vec<Segment> {
    let mut cursor = 0;
    original
        .char_indices()
        .map(|(i, c)| {
            let start = cursor;
            cursor += folded_len(c);
            Segment {
                bytes: i..i + c.len_utf8(),
                start,
                end: cursor,
            }
        })
        .collect()
}

fn map_window(segments: &[Segment], (start, end): (usize, usize)) -> Option<Range<usize>> {
    let first = segments.iter().position(|s| s.end > start)?;
    if segments[first].start != start {
        return None;
    }

    let mut last = first;
    loop {
        let segment = &segments[last];
        if segment.end == end {
            break;
        }
        if segment.end > end {
            return None;
        }
        last += 1;
        if last == segments.len() {
            return None;
        }
    }

    while segments.get(last + 1).is_some_and(Segment::is_empty) {
        last += 1;
    }

    Some(segments[first].bytes.start..segments[last].bytes.end)
}
