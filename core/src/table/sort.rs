//! Tri-state column sorting with type-aware comparison values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Sort State
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the current sort state was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrigin {
    /// Seeded or reset by the table itself
    #[default]
    Reset,
    /// Chosen by a header click
    Clicked,
}

/// What a table falls back to after a column's descending click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy<K> {
    /// Back to server order
    Unsorted,
    /// Back to a fixed key and direction
    Fixed(K, SortDirection),
}

impl<K: Copy + PartialEq> ResetPolicy<K> {
    pub fn reset_state(&self) -> SortState<K> {
        match *self {
            ResetPolicy::Unsorted => SortState::unsorted(),
            ResetPolicy::Fixed(key, direction) => SortState::sorted(key, direction),
        }
    }
}

/// Sort state of one table.
///
/// Key and direction are stored as a pair, so a key without a direction (or
/// the reverse) cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    active: Option<(K, SortDirection)>,
    origin: SortOrigin,
}

impl<K> Default for SortState<K> {
    fn default() -> Self {
        Self {
            active: None,
            origin: SortOrigin::Reset,
        }
    }
}

impl<K: Copy + PartialEq> SortState<K> {
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// A table-chosen sort (seed or reset target).
    pub fn sorted(key: K, direction: SortDirection) -> Self {
        Self {
            active: Some((key, direction)),
            origin: SortOrigin::Reset,
        }
    }

    pub fn key(&self) -> Option<K> {
        self.active.map(|(key, _)| key)
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.active.map(|(_, direction)| direction)
    }

    pub fn active(&self) -> Option<(K, SortDirection)> {
        self.active
    }

    pub fn origin(&self) -> SortOrigin {
        self.origin
    }

    pub fn is_unsorted(&self) -> bool {
        self.active.is_none()
    }

    /// Direction shown on `key`'s header, if the table is sorted by it.
    pub fn direction_for(&self, key: K) -> Option<SortDirection> {
        self.active
            .and_then(|(k, direction)| (k == key).then_some(direction))
    }

    /// Header click on `key`.
    ///
    /// A clicked column walks asc → desc → reset target. Clicking a different
    /// column, or any column while the table sits on its reset target, starts
    /// that column at ascending.
    pub fn handle_sort(&mut self, key: K, policy: &ResetPolicy<K>) {
        *self = match (self.origin, self.active) {
            (SortOrigin::Clicked, Some((k, SortDirection::Asc))) if k == key => Self {
                active: Some((key, SortDirection::Desc)),
                origin: SortOrigin::Clicked,
            },
            (SortOrigin::Clicked, Some((k, SortDirection::Desc))) if k == key => {
                policy.reset_state()
            }
            _ => Self {
                active: Some((key, SortDirection::Asc)),
                origin: SortOrigin::Clicked,
            },
        };
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Comparison Values
// ─────────────────────────────────────────────────────────────────────────────

/// Normalised per-row comparison value.
///
/// Missing data is mapped to sentinels up front so the comparator never sees
/// an "unknown": absent dates become the epoch, absent counts zero and absent
/// rates -1 (below a genuine rate of zero).
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    /// Milliseconds since the epoch
    Instant(i64),
    /// Lowercased text
    Text(String),
}

impl SortValue {
    pub fn date(value: Option<DateTime<Utc>>) -> Self {
        SortValue::Instant(value.map_or(0, |t| t.timestamp_millis()))
    }

    pub fn count(value: Option<i64>) -> Self {
        SortValue::Number(value.map_or(0.0, |n| n as f64))
    }

    /// Plain numeric column; missing or non-finite values sort as zero.
    pub fn number(value: Option<f64>) -> Self {
        SortValue::Number(value.filter(|v| v.is_finite()).unwrap_or(0.0))
    }

    /// Rate column; missing or non-finite values sort below zero.
    pub fn rate(value: Option<f64>) -> Self {
        SortValue::Number(value.filter(|v| v.is_finite()).unwrap_or(-1.0))
    }

    pub fn text(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Number(_) => 0,
            SortValue::Instant(_) => 1,
            SortValue::Text(_) => 2,
        }
    }

    /// Ascending comparison.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Instant(a), SortValue::Instant(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Sort rows by the active column.
///
/// Each row's value is extracted exactly once before sorting. The sort is
/// stable in both directions; an unsorted state returns the rows untouched.
pub fn sort_rows<R, K, F>(rows: Vec<R>, state: &SortState<K>, extract: F) -> Vec<R>
where
    K: Copy + PartialEq,
    F: Fn(&R, K) -> SortValue,
{
    let Some((key, direction)) = state.active() else {
        return rows;
    };

    let mut keyed: Vec<(SortValue, R)> = rows
        .into_iter()
        .map(|row| (extract(&row, key), row))
        .collect();
    keyed.sort_by(|a, b| direction.apply(a.0.compare(&b.0)));
    keyed.into_iter().map(|(_, row)| row).collect()
}
