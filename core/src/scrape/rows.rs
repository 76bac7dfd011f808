//! Render pipelines for the scraper tables.

use chrono::{DateTime, Utc};

use buysearch_types::{ScrapeHistoryEntry, ScraperSummary};

use super::columns::{HistoryColumn, ScraperColumn};
use super::metrics::ScrapeMetrics;
use crate::table::{SortState, SortValue, TableState, filter_rows, sort_rows, truncate_rows};

/// One run, augmented for display.
#[derive(Debug, Clone, Copy)]
pub struct HistoryRow<'a> {
    pub entry: &'a ScrapeHistoryEntry,
    pub metrics: ScrapeMetrics,
}

impl<'a> HistoryRow<'a> {
    pub fn new(entry: &'a ScrapeHistoryEntry, now: DateTime<Utc>) -> Self {
        Self {
            entry,
            metrics: ScrapeMetrics::compute(entry, now),
        }
    }

    pub fn sort_value(&self, column: HistoryColumn) -> SortValue {
        column.sort_value(self.entry, &self.metrics)
    }
}

/// One scraper, represented by its most recent run.
#[derive(Debug, Clone, Copy)]
pub struct ScraperRow<'a> {
    pub name: &'a str,
    pub current: Option<&'a ScrapeHistoryEntry>,
    pub metrics: ScrapeMetrics,
    pub runs: usize,
}

impl<'a> ScraperRow<'a> {
    pub fn new(summary: &'a ScraperSummary, now: DateTime<Utc>) -> Self {
        let current = summary.current();
        Self {
            name: &summary.name,
            current,
            metrics: current
                .map(|entry| ScrapeMetrics::compute(entry, now))
                .unwrap_or_default(),
            runs: summary.history.len(),
        }
    }

    pub fn sort_value(&self, column: ScraperColumn) -> SortValue {
        match column {
            ScraperColumn::Name => SortValue::text(self.name),
            ScraperColumn::Run(col) => match self.current {
                Some(entry) => col.sort_value(entry, &self.metrics),
                // No runs yet: every field is unknown
                None => col.sort_value(&ScrapeHistoryEntry::default(), &self.metrics),
            },
        }
    }
}

/// Main table rows: search by name → augment → sort → cap.
pub fn scraper_rows<'a>(
    summaries: &'a [ScraperSummary],
    table: &TableState<ScraperColumn>,
    now: DateTime<Utc>,
    cap: usize,
) -> Vec<ScraperRow<'a>> {
    let candidates: Vec<&ScraperSummary> = summaries.iter().collect();
    let matched = filter_rows(candidates, &table.search, |s| s.name.as_str());
    let rows: Vec<ScraperRow<'a>> = matched
        .into_iter()
        .map(|summary| ScraperRow::new(summary, now))
        .collect();
    let sorted = sort_rows(rows, &table.sort, |row, col| row.sort_value(col));
    truncate_rows(sorted, cap)
}

/// Detail table rows for one scraper: search by status → augment → sort → cap.
pub fn history_rows<'a>(
    history: &'a [ScrapeHistoryEntry],
    search: &str,
    sort: &SortState<HistoryColumn>,
    now: DateTime<Utc>,
    cap: usize,
) -> Vec<HistoryRow<'a>> {
    let candidates: Vec<&ScrapeHistoryEntry> = history.iter().collect();
    let matched = filter_rows(candidates, search, |e| e.status.as_str());
    let rows: Vec<HistoryRow<'a>> = matched
        .into_iter()
        .map(|entry| HistoryRow::new(entry, now))
        .collect();
    let sorted = sort_rows(rows, sort, |row, col| row.sort_value(col));
    truncate_rows(sorted, cap)
}
