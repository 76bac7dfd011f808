//! Display formatting for scrape tables. Unknown values render as `-`.

use chrono::{DateTime, Utc};

use buysearch_types::ScrapeHistoryEntry;

use super::columns::HistoryColumn;
use super::metrics::ScrapeMetrics;

pub const PLACEHOLDER: &str = "-";

/// Format milliseconds as `1h 02m 03s`, `2m 05s` or `45s`.
pub fn format_duration_ms(ms: Option<i64>) -> String {
    match ms {
        Some(ms) if ms >= 0 => format_duration_secs(ms / 1000),
        _ => PLACEHOLDER.to_string(),
    }
}

fn format_duration_secs(secs: i64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    if hours > 0 {
        format!("{hours}h {mins:02}m {secs:02}s")
    } else if mins > 0 {
        format!("{mins}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

pub fn format_eta(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => format_duration_secs(s.round() as i64),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn format_rate(per_minute: Option<f64>) -> String {
    match per_minute {
        Some(r) if r.is_finite() => format!("{r:.1}/min"),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn format_progress(progress: Option<f64>) -> String {
    match progress {
        Some(p) if p.is_finite() => format!("{p:.0}%"),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Format a count with thousands separators.
pub fn format_count(count: Option<i64>) -> String {
    let Some(n) = count else {
        return PLACEHOLDER.to_string();
    };
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Display text for one cell of a run. A missing run renders every cell
/// as the placeholder.
pub fn format_cell(
    entry: Option<&ScrapeHistoryEntry>,
    metrics: &ScrapeMetrics,
    column: HistoryColumn,
) -> String {
    let Some(entry) = entry else {
        return PLACEHOLDER.to_string();
    };
    match column {
        HistoryColumn::StartTime => format_time(entry.start_time),
        HistoryColumn::EndTime => format_time(entry.end_time),
        HistoryColumn::UpdatedAt => format_time(entry.updated_at),
        HistoryColumn::Status => entry.status.label().to_string(),
        HistoryColumn::Type => entry.kind.as_str().to_string(),
        HistoryColumn::CreatedItems => format_count(entry.created_items),
        HistoryColumn::UpdatedItems => format_count(entry.updated_items),
        HistoryColumn::ScannedItems => format_count(Some(entry.scanned_items())),
        HistoryColumn::TotalItems => format_count(entry.total_items),
        HistoryColumn::Progress => format_progress(entry.progress),
        HistoryColumn::RatePerMinute => format_rate(entry.rate_per_minute),
        HistoryColumn::ScanRate => format_rate(metrics.scan_rate),
        HistoryColumn::RunTime => format_duration_ms(metrics.run_time_ms),
        HistoryColumn::Eta => format_eta(metrics.eta_seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_ms(Some(45_000)), "45s");
        assert_eq!(format_duration_ms(Some(125_000)), "2m 05s");
        assert_eq!(format_duration_ms(Some(3_723_000)), "1h 02m 03s");
        assert_eq!(format_duration_ms(None), "-");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(format_eta(None), "-");
        assert_eq!(format_rate(None), "-");
        assert_eq!(format_progress(None), "-");
        assert_eq!(format_time(None), "-");
        assert_eq!(format_rate(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(Some(0)), "0");
        assert_eq!(format_count(Some(999)), "999");
        assert_eq!(format_count(Some(1_234_567)), "1,234,567");
        assert_eq!(format_count(Some(-4_200)), "-4,200");
        assert_eq!(format_count(None), "-");
    }

    #[test]
    fn test_format_cell_without_run() {
        let metrics = ScrapeMetrics::default();
        for column in HistoryColumn::all() {
            assert_eq!(format_cell(None, &metrics, *column), PLACEHOLDER);
        }
    }

    #[test]
    fn test_format_cell_scanned_sums_counts() {
        let entry = ScrapeHistoryEntry {
            created_items: Some(1_200),
            updated_items: Some(300),
            ..Default::default()
        };
        let metrics = ScrapeMetrics::default();
        assert_eq!(format_cell(Some(&entry), &metrics, HistoryColumn::ScannedItems), "1,500");
        assert_eq!(format_cell(Some(&entry), &metrics, HistoryColumn::RunTime), "-");
    }
}
