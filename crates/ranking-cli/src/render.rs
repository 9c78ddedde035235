//! Plain-text rendering of view models

use ranking_core::{AreaView, Highlighter, PeopleView, Record};
use ranking_sync::{EditorAccount, SaveOutcome, Tier};
use std::fmt::Write;

/// Bold yellow, reset
pub(crate) fn terminal_highlighter() -> Highlighter {
    Highlighter::new("\x1b[1;33m", "\x1b[0m")
}

fn marker(emoji: &str) -> String {
    if emoji.is_empty() {
        String::new()
    } else {
        format!("{emoji} ")
    }
}

pub(crate) fn people(view: &PeopleView, marks: &Highlighter) -> String {
    let mut out = String::new();
    if let Some(empty) = view.empty {
        let _ = writeln!(out, "{empty}");
        return out;
    }

    let _ = writeln!(out, "{}", view.results_label());
    for row in &view.rows {
        let record = &row.record;
        let _ = write!(
            out,
            "{:>3}. {}{}  [{}]",
            row.rank,
            marker(row.podium.emoji()),
            marks.wrap(&record.name, &row.name_spans),
            marks.wrap(&record.area, &row.area_spans),
        );
        if !record.role.is_empty() {
            let _ = write!(out, " {}", marks.wrap(&record.role, &row.role_spans));
        }
        let _ = writeln!(out, "  {} pts", record.points);
    }
    if let Some(pagination) = view.pagination {
        let _ = writeln!(out, "{}", pagination.label());
    }
    out
}

pub(crate) fn areas(view: &AreaView, marks: &Highlighter) -> String {
    let mut out = String::new();
    if let Some(empty) = view.empty {
        let _ = writeln!(out, "{empty}");
        return out;
    }

    let _ = writeln!(out, "{}", view.results_label());
    for row in &view.rows {
        let aggregate = &row.aggregate;
        let _ = writeln!(
            out,
            "{:>3}. {}{}  {} pts  ({} colaboradores)",
            row.rank,
            marker(row.podium.emoji()),
            marks.wrap(&aggregate.area, &row.area_spans),
            aggregate.total_points,
            aggregate.member_count,
        );
    }
    out
}

pub(crate) fn members(area: &str, records: &[&Record]) -> String {
    let mut out = format!("{area}\n");
    if records.is_empty() {
        out.push_str("  (sin colaboradores)\n");
    }
    for (index, record) in records.iter().enumerate() {
        let _ = writeln!(out, "  {:>3}. {}  {} pts", index + 1, record.name, record.points);
    }
    out
}

pub(crate) fn accounts(accounts: &[EditorAccount]) -> String {
    let mut out = String::new();
    for account in accounts {
        let created = account
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let _ = writeln!(out, "{}  <{}>  {}  {created}", account.name, account.email, account.role);
    }
    out
}

pub(crate) fn source(tier: Tier) -> String {
    format!("(datos: {tier})")
}

pub(crate) fn save(outcome: &SaveOutcome) -> String {
    if outcome.success {
        outcome.message.clone()
    } else {
        format!("Error al guardar en el servidor: {}", outcome.message)
    }
}
