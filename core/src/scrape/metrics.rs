use chrono::{DateTime, Utc};

use buysearch_types::ScrapeHistoryEntry;

/// Display-only metrics derived from a history entry and the wall clock.
///
/// These depend on "now" while a run is in progress, so they are recomputed
/// on every render and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrapeMetrics {
    pub run_time_ms: Option<i64>,
    /// Scanned (created + updated) items per minute of run time
    pub scan_rate: Option<f64>,
    /// Linear extrapolation from progress so far. Assumes constant
    /// throughput; no smoothing.
    pub eta_seconds: Option<f64>,
}

impl ScrapeMetrics {
    pub fn compute(entry: &ScrapeHistoryEntry, now: DateTime<Utc>) -> Self {
        let run_time_ms = run_time_ms(entry, now);

        let scan_rate = run_time_ms
            .filter(|ms| *ms > 0)
            .map(|ms| entry.scanned_items() as f64 / (ms as f64 / 60_000.0));

        let eta_seconds = match (entry.progress, run_time_ms) {
            (Some(progress), Some(ms)) if progress > 0.0 && progress <= 100.0 => {
                let elapsed_secs = ms as f64 / 1000.0;
                Some((100.0 - progress) * (elapsed_secs / progress))
            }
            _ => None,
        };

        Self {
            run_time_ms,
            scan_rate,
            eta_seconds,
        }
    }
}

/// Elapsed run time. Running entries are measured up to `now`; otherwise an
/// end time is required. Clock skew never yields a negative duration.
fn run_time_ms(entry: &ScrapeHistoryEntry, now: DateTime<Utc>) -> Option<i64> {
    let start = entry.start_time?;
    let end = if entry.is_running() {
        now
    } else {
        entry.end_time?
    };
    Some((end - start).num_milliseconds().max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use buysearch_types::ScrapeStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn running(progress: Option<f64>, started_secs_ago: i64) -> ScrapeHistoryEntry {
        ScrapeHistoryEntry {
            start_time: Some(now() - Duration::seconds(started_secs_ago)),
            status: ScrapeStatus::InProgress,
            progress,
            ..Default::default()
        }
    }

    #[test]
    fn test_eta_linear_extrapolation() {
        let metrics = ScrapeMetrics::compute(&running(Some(50.0), 100), now());
        let eta = metrics.eta_seconds.unwrap();
        assert!((eta - 100.0).abs() < 1e-9);
        assert_eq!(metrics.run_time_ms, Some(100_000));
    }

    #[test]
    fn test_eta_undefined_without_progress() {
        assert_eq!(ScrapeMetrics::compute(&running(None, 100), now()).eta_seconds, None);
        assert_eq!(ScrapeMetrics::compute(&running(Some(0.0), 100), now()).eta_seconds, None);
    }

    #[test]
    fn test_eta_zero_when_complete() {
        let metrics = ScrapeMetrics::compute(&running(Some(100.0), 60), now());
        assert_eq!(metrics.eta_seconds, Some(0.0));
    }

    #[test]
    fn test_scan_rate() {
        let entry = ScrapeHistoryEntry {
            start_time: Some(now() - Duration::minutes(4)),
            end_time: Some(now() - Duration::minutes(2)),
            status: ScrapeStatus::Finished,
            created_items: Some(30),
            updated_items: Some(70),
            ..Default::default()
        };
        let metrics = ScrapeMetrics::compute(&entry, now());
        assert_eq!(metrics.run_time_ms, Some(120_000));
        assert_eq!(metrics.scan_rate, Some(50.0));
    }

    #[test]
    fn test_finished_without_end_time_has_no_run_time() {
        let entry = ScrapeHistoryEntry {
            start_time: Some(now() - Duration::minutes(4)),
            status: ScrapeStatus::Failed,
            ..Default::default()
        };
        let metrics = ScrapeMetrics::compute(&entry, now());
        assert_eq!(metrics, ScrapeMetrics::default());
    }

    #[test]
    fn test_zero_run_time_has_no_rate() {
        let entry = running(Some(10.0), 0);
        let metrics = ScrapeMetrics::compute(&entry, now());
        assert_eq!(metrics.run_time_ms, Some(0));
        assert_eq!(metrics.scan_rate, None);
    }

    #[test]
    fn test_running_entry_tracks_the_clock() {
        let entry = running(Some(25.0), 60);
        let first = ScrapeMetrics::compute(&entry, now());
        let later = ScrapeMetrics::compute(&entry, now() + Duration::seconds(60));
        assert!(later.run_time_ms > first.run_time_ms);
        assert!(later.eta_seconds > first.eta_seconds);
    }
}
