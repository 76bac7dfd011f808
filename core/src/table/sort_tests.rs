//! Tests for header-click cycling and type-aware sorting

use chrono::{TimeZone, Utc};

use super::{ResetPolicy, SortDirection, SortOrigin, SortState, SortValue, sort_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Col {
    Name,
    Total,
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    name: &'static str,
    total: Option<i64>,
    rate: Option<f64>,
    group: u8,
}

fn row(name: &'static str, total: Option<i64>, rate: Option<f64>, group: u8) -> Row {
    Row {
        name,
        total,
        rate,
        group,
    }
}

fn extract(row: &Row, col: Col) -> SortValue {
    match col {
        Col::Name => SortValue::text(row.name),
        Col::Total => SortValue::count(row.total),
        Col::UpdatedAt => SortValue::rate(row.rate),
    }
}

fn names(rows: &[Row]) -> Vec<&'static str> {
    rows.iter().map(|r| r.name).collect()
}

#[test]
fn test_plain_table_cycle() {
    let policy = ResetPolicy::Unsorted;
    let mut state = SortState::unsorted();

    state.handle_sort(Col::Name, &policy);
    assert_eq!(state.active(), Some((Col::Name, SortDirection::Asc)));

    state.handle_sort(Col::Name, &policy);
    assert_eq!(state.active(), Some((Col::Name, SortDirection::Desc)));

    state.handle_sort(Col::Name, &policy);
    assert!(state.is_unsorted());
    assert_eq!(state.key(), None);
    assert_eq!(state.direction(), None);

    // And round again without skipping
    state.handle_sort(Col::Name, &policy);
    assert_eq!(state.active(), Some((Col::Name, SortDirection::Asc)));
}

#[test]
fn test_fixed_default_cycle_three_clicks() {
    let policy = ResetPolicy::Fixed(Col::UpdatedAt, SortDirection::Desc);
    let mut state = SortState::unsorted();

    for _ in 0..3 {
        state.handle_sort(Col::UpdatedAt, &policy);
    }
    assert_eq!(state.key(), Some(Col::UpdatedAt));
    assert_eq!(state.direction(), Some(SortDirection::Desc));
    assert_eq!(state.origin(), SortOrigin::Reset);

    // From the reset target the next click starts over at ascending
    state.handle_sort(Col::UpdatedAt, &policy);
    assert_eq!(state.active(), Some((Col::UpdatedAt, SortDirection::Asc)));
}

#[test]
fn test_fixed_default_cycle_other_column() {
    let policy = ResetPolicy::Fixed(Col::UpdatedAt, SortDirection::Desc);
    let mut state = SortState::sorted(Col::UpdatedAt, SortDirection::Desc);

    let mut seen = Vec::new();
    for _ in 0..3 {
        state.handle_sort(Col::Total, &policy);
        seen.push(state.active());
    }
    assert_eq!(
        seen,
        vec![
            Some((Col::Total, SortDirection::Asc)),
            Some((Col::Total, SortDirection::Desc)),
            Some((Col::UpdatedAt, SortDirection::Desc)),
        ]
    );
}

#[test]
fn test_switching_column_restarts_at_asc() {
    let policy = ResetPolicy::Unsorted;
    let mut state = SortState::unsorted();
    state.handle_sort(Col::Name, &policy);
    state.handle_sort(Col::Name, &policy);
    state.handle_sort(Col::Total, &policy);
    assert_eq!(state.active(), Some((Col::Total, SortDirection::Asc)));
    assert_eq!(state.direction_for(Col::Name), None);
    assert_eq!(state.direction_for(Col::Total), Some(SortDirection::Asc));
}

#[test]
fn test_unsorted_returns_rows_unchanged() {
    let rows = vec![
        row("b", Some(2), None, 0),
        row("a", Some(1), None, 0),
    ];
    let out = sort_rows(rows.clone(), &SortState::<Col>::unsorted(), extract);
    assert_eq!(out, rows);
}

#[test]
fn test_text_sort_ignores_case() {
    let rows = vec![
        row("zara", None, None, 0),
        row("Adidas", None, None, 0),
        row("nike", None, None, 0),
    ];
    let out = sort_rows(rows, &SortState::sorted(Col::Name, SortDirection::Asc), extract);
    assert_eq!(names(&out), vec!["Adidas", "nike", "zara"]);
}

#[test]
fn test_missing_counts_sort_as_zero() {
    let rows = vec![
        row("five", Some(5), None, 0),
        row("missing", None, None, 0),
        row("one", Some(1), None, 0),
    ];
    let out = sort_rows(rows, &SortState::sorted(Col::Total, SortDirection::Asc), extract);
    assert_eq!(names(&out), vec!["missing", "one", "five"]);
}

#[test]
fn test_missing_rate_sorts_below_zero_rate() {
    let rows = vec![
        row("zero", None, Some(0.0), 0),
        row("none", None, None, 0),
        row("fast", None, Some(12.5), 0),
    ];
    let out = sort_rows(
        rows,
        &SortState::sorted(Col::UpdatedAt, SortDirection::Asc),
        extract,
    );
    assert_eq!(names(&out), vec!["none", "zero", "fast"]);
}

#[test]
fn test_absent_dates_sort_first() {
    let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let values = [
        SortValue::date(Some(late)),
        SortValue::date(None),
        SortValue::date(Some(early)),
    ];
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.compare(b));
    assert_eq!(sorted[0], SortValue::Instant(0));
    assert_eq!(sorted[2], SortValue::date(Some(late)));
}

#[test]
fn test_sort_is_stable_in_both_directions() {
    let rows = vec![
        row("a1", Some(1), None, 1),
        row("b2", Some(2), None, 2),
        row("a2", Some(1), None, 3),
        row("b1", Some(2), None, 4),
    ];

    let asc = SortState::sorted(Col::Total, SortDirection::Asc);
    let once = sort_rows(rows.clone(), &asc, extract);
    assert_eq!(names(&once), vec!["a1", "a2", "b2", "b1"]);
    let twice = sort_rows(once.clone(), &asc, extract);
    assert_eq!(once, twice);

    let desc = SortState::sorted(Col::Total, SortDirection::Desc);
    let once = sort_rows(rows, &desc, extract);
    assert_eq!(names(&once), vec!["b2", "b1", "a1", "a2"]);
    let twice = sort_rows(once.clone(), &desc, extract);
    assert_eq!(
        once.iter().map(|r| r.group).collect::<Vec<_>>(),
        twice.iter().map(|r| r.group).collect::<Vec<_>>()
    );
}

#[test]
fn test_extractor_runs_once_per_row() {
    use std::cell::Cell;

    let calls = Cell::new(0usize);
    let rows: Vec<Row> = (0..20)
        .map(|i| row("r", Some(20 - i), None, i as u8))
        .collect();
    let out = sort_rows(
        rows,
        &SortState::sorted(Col::Total, SortDirection::Asc),
        |r, c| {
            calls.set(calls.get() + 1);
            extract(r, c)
        },
    );
    assert_eq!(calls.get(), 20);
    assert_eq!(out[0].total, Some(1));
}
