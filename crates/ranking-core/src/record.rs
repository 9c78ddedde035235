//! Record model and ingestion
//!
//! Every record that enters the system (remote payload, cache blob, bundled
//! snapshot, CSV line, editor form) goes through the coercion rules here, so
//! that downstream code never sees an absent name, area or a negative score.

use crate::error::{EditError, PayloadError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

/// Name used when a record has none
pub const UNNAMED: &str = "Sin nombre";

/// Area used when a record has none
pub const NO_AREA: &str = "Sin área";

/// One ranked person
///
/// Serialized with the field names the remote store uses (`nombre`, `area`,
/// `cargo`, `puntos`). Deserialization is lenient and goes through
/// [`Record::from_value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Record {
    /// Display name
    #[serde(rename = "nombre")]
    pub name: String,
    /// Organizational area
    pub area: String,
    /// Job title
    #[serde(rename = "cargo")]
    pub role: String,
    /// Score, never negative
    #[serde(rename = "puntos")]
    pub points: u64,
}

impl Record {
    /// Create a record, applying the ingestion defaults to the text fields
    #[must_use]
    pub fn new(
        name: impl AsRef<str>,
        area: impl AsRef<str>,
        role: impl AsRef<str>,
        points: u64,
    ) -> Self {
        Self {
            name: text_or(name.as_ref(), UNNAMED),
            area: text_or(area.as_ref(), NO_AREA),
            role: text_or(role.as_ref(), ""),
            points,
        }
    }

    /// Coerce an arbitrary JSON value into a record
    ///
    /// Returns `None` when the value is not an object. Both the Spanish wire
    /// names and the English field names are accepted.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |wire: &str, alias: &str| object.get(wire).or_else(|| object.get(alias));

        Some(Self {
            name: text_or(&json_text(field("nombre", "name")), UNNAMED),
            area: text_or(&json_text(field("area", "area")), NO_AREA),
            role: text_or(&json_text(field("cargo", "role")), ""),
            points: field("puntos", "points").map_or(0, json_points),
        })
    }

    /// Build a record from positional CSV fields (`name, area, role, points`)
    #[must_use]
    pub fn from_fields(fields: &[String]) -> Self {
        let get = |i: usize| fields.get(i).map_or("", String::as_str);
        Self {
            name: text_or(get(0), UNNAMED),
            area: text_or(get(1), NO_AREA),
            role: text_or(get(2), ""),
            points: coerce_points(get(3)),
        }
    }

    /// Text the people filter is matched against
    #[must_use]
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.area, self.role)
    }
}

impl TryFrom<Value> for Record {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value).ok_or_else(|| "record must be a JSON object".to_string())
    }
}

/// Unvalidated editor form input
///
/// Unlike ingestion, the editor form requires a name and an area instead of
/// falling back to the sentinels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    /// Name as typed
    pub name: String,
    /// Area as typed
    pub area: String,
    /// Role as typed
    pub role: String,
    /// Points as typed
    pub points: String,
}

impl RecordDraft {
    /// Create a draft from form fields
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        area: impl Into<String>,
        role: impl Into<String>,
        points: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            area: area.into(),
            role: role.into(),
            points: points.into(),
        }
    }

    /// Validate the draft into a record
    ///
    /// # Errors
    /// `EditError::MissingField` if the name or the area is blank.
    pub fn into_record(self) -> Result<Record, EditError> {
        let name = self.name.trim();
        let area = self.area.trim();
        if name.is_empty() {
            return Err(EditError::MissingField("name"));
        }
        if area.is_empty() {
            return Err(EditError::MissingField("area"));
        }
        Ok(Record {
            name: name.to_string(),
            area: area.to_string(),
            role: self.role.trim().to_string(),
            points: coerce_points(&self.points),
        })
    }
}

impl From<&Record> for RecordDraft {
    fn from(record: &Record) -> Self {
        Self::new(
            record.name.clone(),
            record.area.clone(),
            record.role.clone(),
            record.points.to_string(),
        )
    }
}

/// Stable identifier assigned to a record when it enters a [`RecordSet`]
///
/// Never serialized: ids live only as long as the set that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub Ulid);

impl RecordId {
    /// Generate new record ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record together with its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Stable id
    pub id: RecordId,
    /// Record value
    pub record: Record,
}

/// Ordered collection of records owned by one session
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    entries: Vec<Entry>,
}

impl RecordSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set, issuing a fresh id for every record
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            entries: records
                .into_iter()
                .map(|record| Entry {
                    id: RecordId::new(),
                    record,
                })
                .collect(),
        }
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Records in insertion order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Owned copy of the records, ready for persistence
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.records().cloned().collect()
    }

    /// Look up a record by id
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.record)
    }

    /// Append a record and return its id
    pub fn push(&mut self, record: Record) -> RecordId {
        let id = RecordId::new();
        self.entries.push(Entry { id, record });
        id
    }

    /// Replace the record with this id, returning the previous value
    ///
    /// # Errors
    /// `EditError::NotFound` if the id is unknown; the set is left untouched.
    pub fn replace(&mut self, id: RecordId, record: Record) -> Result<Record, EditError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(EditError::NotFound(id))?;
        Ok(std::mem::replace(&mut entry.record, record))
    }

    /// Remove the record with this id
    ///
    /// # Errors
    /// `EditError::NotFound` if the id is unknown.
    pub fn remove(&mut self, id: RecordId) -> Result<Record, EditError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(EditError::NotFound(id))?;
        Ok(self.entries.remove(index).record)
    }

    /// Structural comparison of the record contents, ignoring ids
    #[must_use]
    pub fn same_records(&self, other: &[Record]) -> bool {
        self.entries.len() == other.len() && self.records().zip(other).all(|(a, b)| a == b)
    }
}

/// Validate a payload that must be a JSON array of records
///
/// Items that are not objects are dropped; objects are coerced.
///
/// # Errors
/// `PayloadError::NotAnArray` if the value is not an array.
pub fn validate_records(value: &Value) -> Result<Vec<Record>, PayloadError> {
    let items = value
        .as_array()
        .ok_or_else(|| PayloadError::not_an_array(value))?;

    let records: Vec<Record> = items.iter().filter_map(Record::from_value).collect();
    if records.len() != items.len() {
        tracing::debug!(
            dropped = items.len() - records.len(),
            "dropped non-object entries from payload"
        );
    }
    Ok(records)
}

/// Extract records from a `{ "ranking": [...] }` envelope
///
/// # Errors
/// `PayloadError::MissingRanking` if there is no `ranking` array.
pub fn ranking_from_envelope(value: &Value) -> Result<Vec<Record>, PayloadError> {
    match value.get("ranking") {
        Some(ranking @ Value::Array(_)) => validate_records(ranking),
        _ => Err(PayloadError::MissingRanking),
    }
}

/// Extract records from a bundled document: an envelope or a bare array
///
/// # Errors
/// `PayloadError` if the value is neither.
pub fn ranking_from_document(value: &Value) -> Result<Vec<Record>, PayloadError> {
    if value.is_array() {
        validate_records(value)
    } else {
        ranking_from_envelope(value)
    }
}

/// Built-in records used when every other source fails
#[must_use]
pub fn default_records() -> Vec<Record> {
    vec![
        Record::new("María González", "Recursos Humanos", "Directora de Talento", 1250),
        Record::new("Carlos Rodríguez", "Tecnología", "CTO", 1180),
        Record::new("Ana Martínez", "Marketing", "Directora de Marketing Digital", 1120),
    ]
}

/// Parse a points value the way a lenient numeric cast would
///
/// Blank, garbled, negative and non-finite input all become `0`; fractions
/// are truncated.
#[must_use]
pub fn coerce_points(raw: &str) -> u64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    raw.parse::<f64>().map_or(0, points_from_f64)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn points_from_f64(n: f64) -> u64 {
    if n.is_finite() && n > 0.0 {
        n.trunc() as u64
    } else {
        0
    }
}

fn json_points(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .unwrap_or_else(|| n.as_f64().map_or(0, points_from_f64)),
        Value::String(s) => coerce_points(s),
        Value::Bool(true) => 1,
        _ => 0,
    }
}

fn json_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}

fn text_or(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_applies_defaults() {
        let record = Record::from_value(&json!({})).unwrap();
        assert_eq!(record.name, UNNAMED);
        assert_eq!(record.area, NO_AREA);
        assert_eq!(record.role, "");
        assert_eq!(record.points, 0);
    }

    #[test]
    fn from_value_trims_and_coerces() {
        let record = Record::from_value(&json!({
            "nombre": "  Ana  ",
            "area": "   ",
            "cargo": "Lead",
            "puntos": "42"
        }))
        .unwrap();
        assert_eq!(record.name, "Ana");
        assert_eq!(record.area, NO_AREA);
        assert_eq!(record.role, "Lead");
        assert_eq!(record.points, 42);
    }

    #[test]
    fn from_value_accepts_english_names() {
        let record = Record::from_value(&json!({
            "name": "Ana",
            "area": "Ops",
            "role": "Dev",
            "points": 7
        }))
        .unwrap();
        assert_eq!(record, Record::new("Ana", "Ops", "Dev", 7));
    }

    #[test]
    fn garbled_points_become_zero() {
        for raw in [json!("abc"), json!(-5), json!(null), json!([1]), json!(false)] {
            let record = Record::from_value(&json!({ "puntos": raw })).unwrap();
            assert_eq!(record.points, 0, "input {raw}");
        }
    }

    #[test]
    fn fractional_points_truncate() {
        assert_eq!(coerce_points("12.9"), 12);
        assert_eq!(coerce_points(" 7 "), 7);
        assert_eq!(coerce_points("-3"), 0);
        assert_eq!(coerce_points("NaN"), 0);
        assert_eq!(coerce_points("inf"), 0);
        assert_eq!(coerce_points(""), 0);
    }

    #[test]
    fn non_objects_are_not_records() {
        assert!(Record::from_value(&json!("Ana")).is_none());
        assert!(Record::from_value(&json!(null)).is_none());
    }

    #[test]
    fn validate_drops_non_objects() {
        let records = validate_records(&json!([{ "nombre": "Ana" }, 3, "x", null])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ana");
    }

    #[test]
    fn validate_rejects_non_arrays() {
        let err = validate_records(&json!({ "nombre": "Ana" })).unwrap_err();
        assert_eq!(err, PayloadError::NotAnArray { found: "object" });
    }

    #[test]
    fn envelope_requires_ranking_array() {
        assert_eq!(
            ranking_from_envelope(&json!({ "ranking": "nope" })),
            Err(PayloadError::MissingRanking)
        );
        assert_eq!(ranking_from_envelope(&json!({ "ranking": [] })), Ok(vec![]));
    }

    #[test]
    fn document_accepts_bare_array() {
        let records = ranking_from_document(&json!([{ "nombre": "Ana", "puntos": 3 }])).unwrap();
        assert_eq!(records, vec![Record::new("Ana", "", "", 3)]);
    }

    #[test]
    fn serializes_with_wire_names() {
        let value = serde_json::to_value(Record::new("Ana", "Ops", "Dev", 7)).unwrap();
        assert_eq!(
            value,
            json!({ "nombre": "Ana", "area": "Ops", "cargo": "Dev", "puntos": 7 })
        );
        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, Record::new("Ana", "Ops", "Dev", 7));
    }

    #[test]
    fn record_set_edits_by_id() {
        let mut set = RecordSet::from_records(vec![
            Record::new("A", "X", "", 1),
            Record::new("B", "X", "", 2),
        ]);
        let id = set.push(Record::new("C", "Y", "", 3));

        let previous = set.replace(id, Record::new("C", "Y", "", 30)).unwrap();
        assert_eq!(previous.points, 3);
        assert_eq!(set.get(id).unwrap().points, 30);

        let removed = set.remove(id).unwrap();
        assert_eq!(removed.name, "C");
        assert_eq!(set.len(), 2);
        assert_eq!(set.remove(id), Err(EditError::NotFound(id)));
    }

    #[test]
    fn same_records_ignores_ids() {
        let records = vec![Record::new("A", "X", "", 1)];
        let a = RecordSet::from_records(records.clone());
        assert!(a.same_records(&records));
        assert!(!a.same_records(&[Record::new("A", "X", "", 2)]));
        assert!(!a.same_records(&[]));
    }

    #[test]
    fn draft_requires_name_and_area() {
        let err = RecordDraft::new(" ", "Ops", "", "1").into_record().unwrap_err();
        assert_eq!(err, EditError::MissingField("name"));
        let err = RecordDraft::new("Ana", "", "", "1").into_record().unwrap_err();
        assert_eq!(err, EditError::MissingField("area"));

        let record = RecordDraft::new(" Ana ", "Ops", " Dev ", "x").into_record().unwrap();
        assert_eq!(record, Record::new("Ana", "Ops", "Dev", 0));
    }

    #[test]
    fn default_records_are_sorted_descending() {
        let defaults = default_records();
        assert_eq!(defaults.len(), 3);
        assert!(defaults.windows(2).all(|w| w[0].points >= w[1].points));
    }
}
