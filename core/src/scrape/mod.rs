//! Scraper status: derived run metrics, sortable columns and the render
//! pipelines behind the admin status tables.

mod columns;
pub mod format;
mod metrics;
mod rows;

#[cfg(test)]
mod pipeline_tests;

pub use columns::{HistoryColumn, ScraperColumn};
pub use metrics::ScrapeMetrics;
pub use rows::{HistoryRow, ScraperRow, history_rows, scraper_rows};
