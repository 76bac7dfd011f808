//! Tests for the scraper table pipelines

use chrono::{DateTime, Duration, TimeZone, Utc};

use buysearch_types::{ScrapeHistoryEntry, ScrapeStatus, ScraperSummary};

use super::{HistoryColumn, ScraperColumn, history_rows, scraper_rows};
use crate::table::{SortDirection, SortState, TableState};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn entry(id: i64, status: ScrapeStatus, started_mins_ago: i64, updated_mins_ago: i64) -> ScrapeHistoryEntry {
    ScrapeHistoryEntry {
        id,
        start_time: Some(now() - Duration::minutes(started_mins_ago)),
        end_time: (status != ScrapeStatus::InProgress)
            .then(|| now() - Duration::minutes(started_mins_ago - 1)),
        status,
        created_items: Some(id * 10),
        updated_items: Some(id),
        updated_at: Some(now() - Duration::minutes(updated_mins_ago)),
        ..Default::default()
    }
}

fn summary(name: &str, history: Vec<ScrapeHistoryEntry>) -> ScraperSummary {
    ScraperSummary {
        name: name.to_string(),
        history,
    }
}

fn fixtures() -> Vec<ScraperSummary> {
    vec![
        summary("Nike", vec![entry(3, ScrapeStatus::InProgress, 30, 1)]),
        summary("Zara", vec![entry(1, ScrapeStatus::Finished, 90, 60)]),
        summary("Asos", vec![entry(2, ScrapeStatus::Failed, 20, 10)]),
        summary("Empty", Vec::new()),
    ]
}

fn names(rows: &[super::ScraperRow<'_>]) -> Vec<String> {
    rows.iter().map(|r| r.name.to_string()).collect()
}

#[test]
fn test_scraper_table_default_order_is_recent_first() {
    let data = fixtures();
    let table = ScraperColumn::table_state();
    let rows = scraper_rows(&data, &table, now(), 50);
    // Scrapers without runs carry an epoch date and sink to the bottom
    assert_eq!(names(&rows), vec!["Nike", "Asos", "Zara", "Empty"]);
}

#[test]
fn test_scraper_table_search_then_sort() {
    let data = fixtures();
    let mut table = ScraperColumn::table_state();
    table.search = "a".to_string();
    table.handle_sort(ScraperColumn::Name);
    let rows = scraper_rows(&data, &table, now(), 50);
    assert_eq!(names(&rows), vec!["Asos", "Zara"]);
}

#[test]
fn test_scraper_table_search_scenario() {
    let data = fixtures();
    let mut table = ScraperColumn::table_state();
    table.search = "ni".to_string();
    let rows = scraper_rows(&data, &table, now(), 50);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Nike");
    assert_eq!(rows[0].current.map(|e| e.status), Some(ScrapeStatus::InProgress));
}

#[test]
fn test_scraper_table_three_clicks_snap_back() {
    let mut table: TableState<ScraperColumn> = ScraperColumn::table_state();
    table.sort = SortState::unsorted();
    for _ in 0..3 {
        table.handle_sort(ScraperColumn::Run(HistoryColumn::UpdatedAt));
    }
    assert_eq!(
        table.sort.active(),
        Some((ScraperColumn::Run(HistoryColumn::UpdatedAt), SortDirection::Desc))
    );
}

#[test]
fn test_sort_by_computed_scanned_items() {
    let data = fixtures();
    let mut table = ScraperColumn::table_state();
    table.handle_sort(ScraperColumn::Run(HistoryColumn::ScannedItems));
    let rows = scraper_rows(&data, &table, now(), 50);
    assert_eq!(names(&rows), vec!["Empty", "Zara", "Asos", "Nike"]);
}

#[test]
fn test_row_cap_applies_after_sort() {
    let data = fixtures();
    let mut table = ScraperColumn::table_state();
    table.handle_sort(ScraperColumn::Name);
    let rows = scraper_rows(&data, &table, now(), 2);
    assert_eq!(names(&rows), vec!["Asos", "Empty"]);
}

#[test]
fn test_history_rows_by_status_search_and_eta() {
    let mut running = entry(5, ScrapeStatus::InProgress, 10, 0);
    running.progress = Some(50.0);
    let history = vec![
        entry(1, ScrapeStatus::Finished, 300, 200),
        running,
        entry(2, ScrapeStatus::Failed, 100, 90),
    ];

    let newest_first = SortState::sorted(HistoryColumn::StartTime, SortDirection::Desc);
    let rows = history_rows(&history, "", &newest_first, now(), 50);
    let ids: Vec<i64> = rows.iter().map(|r| r.entry.id).collect();
    assert_eq!(ids, vec![5, 2, 1]);
    assert_eq!(rows[0].metrics.eta_seconds, Some(600.0));

    let failed = history_rows(&history, "FAIL", &newest_first, now(), 50);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].entry.id, 2);

    let by_eta = SortState::sorted(HistoryColumn::Eta, SortDirection::Asc);
    let rows = history_rows(&history, "", &by_eta, now(), 50);
    // Runs without an ETA keep their relative order ahead of the running one
    let ids: Vec<i64> = rows.iter().map(|r| r.entry.id).collect();
    assert_eq!(ids, vec![1, 2, 5]);
}

#[test]
fn test_history_view_state_seeds_newest_first() {
    let mut view = HistoryColumn::view_state::<String>();
    let id = "Nike".to_string();
    view.toggle_expanded(&id);
    assert_eq!(view.sort_state(&id).key(), Some(HistoryColumn::StartTime));
    assert_eq!(view.sort_state(&id).direction(), Some(SortDirection::Desc));
}

#[test]
fn test_column_parsing() {
    assert_eq!("name".parse::<ScraperColumn>(), Ok(ScraperColumn::Name));
    assert_eq!(
        "updatedAt".parse::<ScraperColumn>(),
        Ok(ScraperColumn::Run(HistoryColumn::UpdatedAt))
    );
    assert_eq!("eta".parse::<HistoryColumn>(), Ok(HistoryColumn::Eta));
    assert!("bogus".parse::<HistoryColumn>().is_err());
}
