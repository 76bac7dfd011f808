//! Sortable columns of the scraper status tables.

use std::fmt;
use std::str::FromStr;

use buysearch_types::ScrapeHistoryEntry;

use super::metrics::ScrapeMetrics;
use crate::table::{ResetPolicy, SortDirection, SortState, SortValue, TableState, TableViewState};

// ─────────────────────────────────────────────────────────────────────────────
// History (per-run) Columns
// ─────────────────────────────────────────────────────────────────────────────

/// Columns of a scraper's run history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryColumn {
    StartTime,
    EndTime,
    Status,
    CreatedItems,
    UpdatedItems,
    ScannedItems,
    TotalItems,
    Progress,
    RatePerMinute,
    RunTime,
    ScanRate,
    Eta,
    Type,
    UpdatedAt,
}

impl HistoryColumn {
    pub fn all() -> &'static [HistoryColumn] {
        &[
            HistoryColumn::StartTime,
            HistoryColumn::EndTime,
            HistoryColumn::Status,
            HistoryColumn::CreatedItems,
            HistoryColumn::UpdatedItems,
            HistoryColumn::ScannedItems,
            HistoryColumn::TotalItems,
            HistoryColumn::Progress,
            HistoryColumn::RatePerMinute,
            HistoryColumn::RunTime,
            HistoryColumn::ScanRate,
            HistoryColumn::Eta,
            HistoryColumn::Type,
            HistoryColumn::UpdatedAt,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            HistoryColumn::StartTime => "startTime",
            HistoryColumn::EndTime => "endTime",
            HistoryColumn::Status => "status",
            HistoryColumn::CreatedItems => "createdItems",
            HistoryColumn::UpdatedItems => "updatedItems",
            HistoryColumn::ScannedItems => "scannedItems",
            HistoryColumn::TotalItems => "totalItems",
            HistoryColumn::Progress => "progress",
            HistoryColumn::RatePerMinute => "ratePerMinute",
            HistoryColumn::RunTime => "runTime",
            HistoryColumn::ScanRate => "scanRate",
            HistoryColumn::Eta => "eta",
            HistoryColumn::Type => "type",
            HistoryColumn::UpdatedAt => "updatedAt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HistoryColumn::StartTime => "Started",
            HistoryColumn::EndTime => "Ended",
            HistoryColumn::Status => "Status",
            HistoryColumn::CreatedItems => "Created",
            HistoryColumn::UpdatedItems => "Updated",
            HistoryColumn::ScannedItems => "Scanned",
            HistoryColumn::TotalItems => "Total",
            HistoryColumn::Progress => "Progress",
            HistoryColumn::RatePerMinute => "Rate/min",
            HistoryColumn::RunTime => "Run time",
            HistoryColumn::ScanRate => "Scan rate",
            HistoryColumn::Eta => "ETA",
            HistoryColumn::Type => "Type",
            HistoryColumn::UpdatedAt => "Last update",
        }
    }

    /// Normalised comparison value for one run.
    pub fn sort_value(&self, entry: &ScrapeHistoryEntry, metrics: &ScrapeMetrics) -> SortValue {
        match self {
            HistoryColumn::StartTime => SortValue::date(entry.start_time),
            HistoryColumn::EndTime => SortValue::date(entry.end_time),
            HistoryColumn::UpdatedAt => SortValue::date(entry.updated_at),
            HistoryColumn::Status => SortValue::text(entry.status.as_str()),
            HistoryColumn::Type => SortValue::text(entry.kind.as_str()),
            HistoryColumn::CreatedItems => SortValue::count(entry.created_items),
            HistoryColumn::UpdatedItems => SortValue::count(entry.updated_items),
            HistoryColumn::ScannedItems => SortValue::count(Some(entry.scanned_items())),
            HistoryColumn::TotalItems => SortValue::count(entry.total_items),
            HistoryColumn::Progress => SortValue::number(entry.progress),
            HistoryColumn::RatePerMinute => SortValue::rate(entry.rate_per_minute),
            HistoryColumn::RunTime => SortValue::count(metrics.run_time_ms),
            HistoryColumn::ScanRate => SortValue::rate(metrics.scan_rate),
            HistoryColumn::Eta => SortValue::rate(metrics.eta_seconds),
        }
    }

    /// Detail tables open newest-first and fall back to server order.
    pub fn view_state<Id>() -> TableViewState<Id, HistoryColumn>
    where
        Id: Eq + std::hash::Hash + Clone,
    {
        TableViewState::new(
            SortState::sorted(HistoryColumn::StartTime, SortDirection::Desc),
            ResetPolicy::Unsorted,
        )
    }
}

impl FromStr for HistoryColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HistoryColumn::all()
            .iter()
            .copied()
            .find(|col| col.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown column '{wanted}'"))
    }
}

impl fmt::Display for HistoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scraper (summary) Columns
// ─────────────────────────────────────────────────────────────────────────────

/// Columns of the main scraper table: the scraper name plus the columns of
/// its current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScraperColumn {
    Name,
    Run(HistoryColumn),
}

impl ScraperColumn {
    pub const DEFAULT_KEY: ScraperColumn = ScraperColumn::Run(HistoryColumn::UpdatedAt);

    pub fn key(&self) -> &'static str {
        match self {
            ScraperColumn::Name => "name",
            ScraperColumn::Run(col) => col.key(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScraperColumn::Name => "Scraper",
            ScraperColumn::Run(col) => col.label(),
        }
    }

    /// The main table starts on, and snaps back to, most recently updated
    /// first instead of going unsorted.
    pub fn table_state() -> TableState<ScraperColumn> {
        TableState::new(
            SortState::sorted(Self::DEFAULT_KEY, SortDirection::Desc),
            ResetPolicy::Fixed(Self::DEFAULT_KEY, SortDirection::Desc),
        )
    }
}

impl FromStr for ScraperColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("name") {
            return Ok(ScraperColumn::Name);
        }
        s.parse().map(ScraperColumn::Run)
    }
}

impl fmt::Display for ScraperColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
