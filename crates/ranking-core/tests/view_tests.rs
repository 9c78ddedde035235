use pretty_assertions::assert_eq;
use proptest::prelude::*;
use ranking_core::csv::{decode, encode_areas, encode_people};
use ranking_core::{
    aggregate_by_area, default_records, highlight, normalize, AreaViewState, PeopleViewState,
    Record, RecordSet, DEFAULT_PAGE_SIZE,
};

#[test]
fn test_defaults_render_with_podium() {
    let set = RecordSet::from_records(default_records());
    let view = PeopleViewState::new().build(&set);

    let rows: Vec<(usize, &str, &str)> = view
        .rows
        .iter()
        .map(|r| (r.rank, r.podium.emoji(), r.record.name.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (1, "🥇", "María González"),
            (2, "🥈", "Carlos Rodríguez"),
            (3, "🥉", "Ana Martínez"),
        ]
    );
    assert_eq!(view.results_label(), "3 resultados");
}

#[test]
fn test_search_then_highlight() {
    let set = RecordSet::from_records(default_records());
    let mut state = PeopleViewState::new();
    state.set_filter("gonzalez");

    let view = state.build(&set);
    assert_eq!(view.visible_count, 1);
    let row = &view.rows[0];
    assert_eq!(
        highlight(&row.record.name, state.normalized_filter()),
        r#"María <span class="highlight">González</span>"#
    );
}

#[test]
fn test_import_export_round_trip_through_views() {
    let records = vec![
        Record::new("Ana; \"La Jefa\"", "Tecnología", "CTO", 90),
        Record::new("Luis", "Tecnología", "Dev", 10),
        Record::new("Marta", "Ventas", "", 50),
    ];
    let decoded = decode(&encode_people(&records)).unwrap();
    assert_eq!(decoded, records);

    let set = RecordSet::from_records(decoded);
    let areas = AreaViewState::new().build(&set);
    assert_eq!(areas.rows[0].aggregate.area, "Tecnología");
    assert_eq!(areas.rows[0].aggregate.total_points, 100);

    let csv = encode_areas(&aggregate_by_area(set.records()));
    assert_eq!(
        csv.lines().collect::<Vec<_>>(),
        vec![
            "Área;Puntos Totales;Cantidad de Colaboradores",
            "\"Tecnología\";\"100\";\"2\"",
            "\"Ventas\";\"50\";\"1\"",
        ]
    );
}

proptest! {
    #[test]
    fn prop_pages_partition_visible_rows(n in 0usize..45, size in 1usize..15) {
        let set = RecordSet::from_records((0..n).map(|i| {
            Record::new(format!("P{i}"), "A", "", u64::try_from(i % 7).unwrap())
        }));
        let mut state = PeopleViewState::new().with_page_size(size);
        let first = state.build(&set);
        prop_assert_eq!(first.total_pages, n.div_ceil(size));
        prop_assert_eq!(first.pagination.is_some(), n > size);

        let mut ranks = Vec::new();
        loop {
            let view = state.build(&set);
            ranks.extend(view.rows.iter().map(|r| r.rank));
            if !state.next_page(&set) {
                break;
            }
        }
        prop_assert_eq!(ranks, (1..=n).collect::<Vec<_>>());
    }

    #[test]
    fn prop_filtered_rows_contain_filter(filter in "[a-c]{1,2}") {
        let set = RecordSet::from_records(
            ["abc", "Ábaco", "cab", "bcb", "ccc"].iter().map(|n| Record::new(n, "X", "", 1)),
        );
        let mut state = PeopleViewState::new().with_page_size(DEFAULT_PAGE_SIZE);
        state.set_filter(filter.clone());
        for row in state.build(&set).rows {
            prop_assert!(normalize(&row.record.search_text()).contains(&filter));
        }
    }
}
