//! Semicolon-delimited CSV interchange
//!
//! Encoding quotes every data field and doubles embedded quotes; the header
//! row is written bare. Decoding is line oriented: a record never spans
//! lines, and `\r\n` endings are accepted.

use crate::aggregate::AreaAggregate;
use crate::error::ImportError;
use crate::record::Record;

/// Field delimiter
pub const DELIMITER: char = ';';

/// Header of the people export
pub const PEOPLE_HEADER: [&str; 4] = ["Nombre", "Área", "Cargo", "Puntos"];

/// Header of the areas export
pub const AREAS_HEADER: [&str; 3] = ["Área", "Puntos Totales", "Cantidad de Colaboradores"];

const BOM: char = '\u{feff}';

/// A value that can be written as one CSV row
pub trait CsvRow {
    /// Cell values in column order, unquoted
    fn cells(&self) -> Vec<String>;
}

impl CsvRow for Record {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.area.clone(),
            self.role.clone(),
            self.points.to_string(),
        ]
    }
}

impl CsvRow for AreaAggregate {
    fn cells(&self) -> Vec<String> {
        vec![
            self.area.clone(),
            self.total_points.to_string(),
            self.member_count.to_string(),
        ]
    }
}

/// Split one line into fields
///
/// `""` inside quotes is a literal quote, any other quote toggles quoting and
/// `;` separates fields only outside quotes. Fields are trimmed.
#[must_use]
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            DELIMITER if !quoted => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Decode people CSV into records
///
/// The first non-blank line is the header and is discarded. Lines with
/// fewer than two fields are skipped.
///
/// # Errors
/// - `ImportError::TooFewLines` without a header and at least one data line
/// - `ImportError::NoRecords` if no line yields a record
pub fn decode(text: &str) -> Result<Vec<Record>, ImportError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(ImportError::TooFewLines { found: lines.len() });
    }

    let mut records = Vec::with_capacity(lines.len() - 1);
    for (index, line) in lines.iter().enumerate().skip(1) {
        let fields = parse_line(line);
        if fields.len() < 2 {
            tracing::debug!(line = index + 1, "skipping CSV line with fewer than two fields");
            continue;
        }
        records.push(Record::from_fields(&fields));
    }

    if records.is_empty() {
        return Err(ImportError::NoRecords);
    }
    tracing::debug!(count = records.len(), "decoded CSV records");
    Ok(records)
}

/// Encode rows under a header
///
/// No trailing newline is written.
#[must_use]
pub fn encode<R: CsvRow>(rows: &[R], header: &[&str]) -> String {
    let delimiter = DELIMITER.to_string();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.join(&delimiter));
    lines.extend(rows.iter().map(|row| {
        row.cells()
            .iter()
            .map(|cell| quote(cell))
            .collect::<Vec<_>>()
            .join(&delimiter)
    }));
    lines.join("\n")
}

/// Encode records with the people header
#[must_use]
pub fn encode_people(records: &[Record]) -> String {
    encode(records, &PEOPLE_HEADER)
}

/// Encode area aggregates with the areas header
#[must_use]
pub fn encode_areas(aggregates: &[AreaAggregate]) -> String {
    encode(aggregates, &AREAS_HEADER)
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
