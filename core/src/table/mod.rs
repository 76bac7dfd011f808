//! Client-side table engine
//!
//! Rows flow through a fixed pipeline on every render:
//!
//! ```text
//! rows ──► filter_rows (substring) ──► augment (caller) ──► sort_rows ──► truncate_rows
//! ```
//!
//! Nothing here is cached; each stage is a pure function of its inputs.

mod search;
mod sort;
mod view;

#[cfg(test)]
mod sort_tests;

pub use search::{filter_rows, matches_query, truncate_rows};
pub use sort::{ResetPolicy, SortDirection, SortOrigin, SortState, SortValue, sort_rows};
pub use view::{TableState, TableViewState};

/// Maximum rows a table renders after filtering and sorting.
pub const DEFAULT_ROW_CAP: usize = 50;
