//! Error types for the ranking core
//!
//! Covers the failures the pure layer can report:
//! - Payload validation (data that is not a list of records)
//! - CSV import (MalformedImport)
//! - Editor mutations

use crate::record::RecordId;

/// A fetched or cached payload does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// Expected a JSON array of records
    #[error("expected an array of records, got {found}")]
    NotAnArray {
        /// JSON type that was found instead
        found: &'static str,
    },

    /// Envelope object without a `ranking` array
    #[error("payload has no `ranking` array")]
    MissingRanking,
}

impl PayloadError {
    /// Create a not-an-array error describing the offending value
    #[must_use]
    pub fn not_an_array(value: &serde_json::Value) -> Self {
        Self::NotAnArray {
            found: json_type_name(value),
        }
    }
}

/// Errors while importing CSV text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    /// Header plus at least one data line is required
    #[error("CSV must contain a header and at least one data line (found {found} non-blank lines)")]
    TooFewLines {
        /// Number of non-blank lines found
        found: usize,
    },

    /// No line produced a record
    #[error("no valid records found in CSV")]
    NoRecords,
}

/// Errors from editor mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// No record with this id in the set
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// A required form field was blank
    #[error("field `{0}` is required")]
    MissingField(&'static str),
}

/// Combined core error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Payload validation failed
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// CSV import failed
    #[error("import error: {0}")]
    Import(#[from] ImportError),

    /// Editor mutation rejected
    #[error("edit error: {0}")]
    Edit(#[from] EditError),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
