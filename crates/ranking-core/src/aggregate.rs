//! Per-area aggregation

use crate::record::{Record, NO_AREA};
use indexmap::IndexMap;
use serde::Serialize;

/// Points and head count of one area
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaAggregate {
    /// Area name (trimmed)
    pub area: String,
    /// Sum of member points
    pub total_points: u64,
    /// Number of members
    pub member_count: usize,
}

/// Group records by area, sorted by descending total
///
/// Areas with equal totals keep the order in which they were first seen.
#[must_use]
pub fn aggregate_by_area<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<AreaAggregate> {
    let mut areas: IndexMap<String, AreaAggregate> = IndexMap::new();
    for record in records {
        let key = area_key(&record.area);
        let entry = areas.entry(key.to_string()).or_insert_with(|| AreaAggregate {
            area: key.to_string(),
            total_points: 0,
            member_count: 0,
        });
        entry.total_points = entry.total_points.saturating_add(record.points);
        entry.member_count += 1;
    }

    let mut list: Vec<AreaAggregate> = areas.into_values().collect();
    list.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    list
}

/// Members of one area, sorted by descending points
#[must_use]
pub fn members_of_area<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    area: &str,
) -> Vec<&'a Record> {
    let wanted = area_key(area);
    let mut members: Vec<&Record> = records
        .into_iter()
        .filter(|r| area_key(&r.area) == wanted)
        .collect();
    members.sort_by(|a, b| b.points.cmp(&a.points));
    members
}

fn area_key(area: &str) -> &str {
    let trimmed = area.trim();
    if trimmed.is_empty() {
        NO_AREA
    } else {
        trimmed
    }
}
