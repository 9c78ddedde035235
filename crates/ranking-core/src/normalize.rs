//! Search-key normalization
//!
//! Decompose (NFD), drop combining marks, lower-case. Folding is applied one
//! source character at a time so that normalizing a concatenation equals
//! concatenating the normalized parts; [`crate::highlight`] relies on that to
//! map matches back onto the original text.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize text for case- and accent-insensitive matching
///
/// ```rust
/// use ranking_core::normalize;
/// assert_eq!(normalize("José Núñez"), "jose nunez");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    text.chars().flat_map(fold_char).collect()
}

/// Normalized form of a single character
///
/// May be empty (a stray combining mark) or longer than one character.
pub fn fold_char(c: char) -> impl Iterator<Item = char> {
    std::iter::once(c)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        // lower-casing can reintroduce marks (U+0130 → i + U+0307)
        .filter(|c| !is_combining_mark(*c))
}

/// Byte length of the normalized form of `c`
#[must_use]
pub fn folded_len(c: char) -> usize {
    fold_char(c).map(char::len_utf8).sum()
}
