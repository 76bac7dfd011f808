//! Shared wire types for BuySearch
//!
//! This crate contains the serializable types exchanged with the BuySearch API.
//! It is shared between the native logic crate (buysearch-core), the shell
//! (buysearch-cli) and the WASM frontend (app-ui), so it only depends on serde
//! and chrono.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel meaning "this dimension is unconstrained".
pub const ALL: &str = "All";

// ─────────────────────────────────────────────────────────────────────────────
// Multi-select
// ─────────────────────────────────────────────────────────────────────────────

/// A multi-valued filter dimension.
///
/// On the wire this is either the string `"All"` or an array of values. An
/// empty array, `["All"]`, or any array containing `"All"` all decode to
/// [`MultiSelect::All`]; a `Values` list is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawSelect", into = "RawSelect")]
pub enum MultiSelect {
    #[default]
    All,
    Values(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawSelect {
    One(String),
    Many(Vec<String>),
}

impl From<RawSelect> for MultiSelect {
    fn from(raw: RawSelect) -> Self {
        match raw {
            RawSelect::One(value) => MultiSelect::from_values([value]),
            RawSelect::Many(values) => MultiSelect::from_values(values),
        }
    }
}

impl From<MultiSelect> for RawSelect {
    fn from(select: MultiSelect) -> Self {
        match select {
            MultiSelect::All => RawSelect::One(ALL.to_string()),
            MultiSelect::Values(values) => RawSelect::Many(values),
        }
    }
}

impl MultiSelect {
    /// Build a selection from raw values, trimming blanks and duplicates.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if value == ALL {
                return MultiSelect::All;
            }
            if !out.iter().any(|v| v == value) {
                out.push(value.to_string());
            }
        }
        if out.is_empty() {
            MultiSelect::All
        } else {
            MultiSelect::Values(out)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, MultiSelect::All)
    }

    /// Selected values; empty for `All`.
    pub fn values(&self) -> &[String] {
        match self {
            MultiSelect::All => &[],
            MultiSelect::Values(values) => values,
        }
    }

    /// Whether `value` passes this constraint (always true for `All`).
    pub fn allows(&self, value: &str) -> bool {
        match self {
            MultiSelect::All => true,
            MultiSelect::Values(values) => values.iter().any(|v| v.eq_ignore_ascii_case(value)),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().iter().any(|v| v == value)
    }

    /// Add or remove a single value. Removing the last value reverts to `All`,
    /// and toggling the sentinel itself clears the selection.
    pub fn toggle(&mut self, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if value == ALL {
            *self = MultiSelect::All;
            return;
        }
        match self {
            MultiSelect::All => *self = MultiSelect::Values(vec![value.to_string()]),
            MultiSelect::Values(values) => {
                if let Some(pos) = values.iter().position(|v| v == value) {
                    values.remove(pos);
                    if values.is_empty() {
                        *self = MultiSelect::All;
                    }
                } else {
                    values.push(value.to_string());
                }
            }
        }
    }
}

impl fmt::Display for MultiSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiSelect::All => f.write_str(ALL),
            MultiSelect::Values(values) => f.write_str(&values.join(", ")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filter Selection
// ─────────────────────────────────────────────────────────────────────────────

/// Product result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Relevance => "Relevance",
            SortMode::PriceAsc => "PriceAsc",
            SortMode::PriceDesc => "PriceDesc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Relevance => "Relevance",
            SortMode::PriceAsc => "Price: low to high",
            SortMode::PriceDesc => "Price: high to low",
        }
    }

    pub fn all() -> &'static [SortMode] {
        &[SortMode::Relevance, SortMode::PriceAsc, SortMode::PriceDesc]
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::all()
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort mode '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Men,
    Women,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "men",
            Gender::Women => "women",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "men" => Ok(Gender::Men),
            "women" => Ok(Gender::Women),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

/// Price band. `label` is always present; an open-ended band leaves one
/// bound empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::all()
    }
}

impl PriceRange {
    pub fn all() -> Self {
        Self {
            label: ALL.to_string(),
            from: None,
            to: None,
        }
    }

    pub fn new(label: impl Into<String>, from: Option<f64>, to: Option<f64>) -> Self {
        Self {
            label: label.into(),
            from,
            to,
        }
    }

    pub fn is_all(&self) -> bool {
        let label = self.label.trim();
        label.is_empty() || label == ALL
    }

    pub fn contains(&self, price: f64) -> bool {
        if self.is_all() {
            return true;
        }
        self.from.is_none_or(|from| price >= from) && self.to.is_none_or(|to| price <= to)
    }

    /// Bands offered by the price selector.
    pub fn presets() -> Vec<PriceRange> {
        vec![
            PriceRange::all(),
            PriceRange::new("Under 50", None, Some(50.0)),
            PriceRange::new("50 - 100", Some(50.0), Some(100.0)),
            PriceRange::new("100 - 200", Some(100.0), Some(200.0)),
            PriceRange::new("200 - 500", Some(200.0), Some(500.0)),
            PriceRange::new("500+", Some(500.0), None),
        ]
    }
}

/// Multi-valued dimensions of a [`FilterSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Brand,
    Category,
    Color,
    Source,
}

impl Facet {
    pub fn key(&self) -> &'static str {
        match self {
            Facet::Brand => "brand",
            Facet::Category => "category",
            Facet::Color => "color",
            Facet::Source => "source",
        }
    }

    pub fn all() -> &'static [Facet] {
        &[Facet::Brand, Facet::Category, Facet::Color, Facet::Source]
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Facet::all()
            .iter()
            .copied()
            .find(|facet| facet.key() == key || format!("{}s", facet.key()) == key)
            .ok_or_else(|| format!("unknown filter '{s}'"))
    }
}

/// The active product search constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: SortMode,
    #[serde(default)]
    pub brand: MultiSelect,
    #[serde(default)]
    pub category: MultiSelect,
    #[serde(default)]
    pub color: MultiSelect,
    #[serde(default)]
    pub price_range: PriceRange,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub is_favourite: bool,
    #[serde(default)]
    pub with_price_change: bool,
    #[serde(default)]
    pub source: MultiSelect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_on_sale: Option<bool>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortMode::Relevance,
            brand: MultiSelect::All,
            category: MultiSelect::All,
            color: MultiSelect::All,
            price_range: PriceRange::all(),
            gender: Gender::Men,
            is_favourite: false,
            with_price_change: false,
            source: MultiSelect::All,
            is_on_sale: None,
        }
    }
}

impl FilterSelection {
    pub fn facet(&self, facet: Facet) -> &MultiSelect {
        match facet {
            Facet::Brand => &self.brand,
            Facet::Category => &self.category,
            Facet::Color => &self.color,
            Facet::Source => &self.source,
        }
    }

    pub fn facet_mut(&mut self, facet: Facet) -> &mut MultiSelect {
        match facet {
            Facet::Brand => &mut self.brand,
            Facet::Category => &mut self.category,
            Facet::Color => &mut self.color,
            Facet::Source => &mut self.source,
        }
    }

    /// Number of dimensions narrowed away from their defaults (gender and
    /// sort are not constraints).
    pub fn active_constraints(&self) -> usize {
        let facets = Facet::all()
            .iter()
            .filter(|f| !self.facet(**f).is_all())
            .count();
        facets
            + usize::from(!self.search.trim().is_empty())
            + usize::from(!self.price_range.is_all())
            + usize::from(self.is_favourite)
            + usize::from(self.with_price_change)
            + usize::from(self.is_on_sale.is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timestamps
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a backend timestamp: RFC 3339, naive ISO (assumed UTC) or epoch
/// milliseconds as text.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Serde adapter for optional timestamps that never fails: anything that is
/// not a recognisable timestamp decodes as `None`.
pub mod lenient_time {
    use super::parse_timestamp;
    use chrono::{DateTime, Utc};
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Millis(i64),
        Other(IgnoredAny),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawTimestamp> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawTimestamp::Text(text)) => parse_timestamp(&text),
            Some(RawTimestamp::Millis(ms)) => DateTime::<Utc>::from_timestamp_millis(ms),
            Some(RawTimestamp::Other(_)) | None => None,
        })
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_some(&t.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }
}

/// Raw wire form of a number field that may arrive as an integer, a float
/// or a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl RawNumber {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Int(n) => *n as f64,
            RawNumber::Float(f) => *f,
            RawNumber::Text(text) => text.trim().parse::<f64>().ok()?,
            RawNumber::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    fn as_i64(&self) -> Option<i64> {
        if let RawNumber::Int(n) = self {
            return Some(*n);
        }
        if let RawNumber::Text(text) = self
            && let Ok(n) = text.trim().parse::<i64>()
        {
            return Some(n);
        }
        self.as_f64()
            .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f.round() as i64)
    }
}

/// Serde adapter for optional integers: floats are rounded, numeric strings
/// parsed, anything else decodes as `None`.
pub mod lenient_int {
    use super::RawNumber;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawNumber> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|r| r.as_i64()))
    }

    pub fn serialize<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }
}

/// Serde adapter for optional floats: numeric strings are parsed, anything
/// else (including NaN and infinities) decodes as `None`.
pub mod lenient_float {
    use super::RawNumber;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawNumber> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|r| r.as_f64()))
    }

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scraping History
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    InProgress,
    Finished,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ScrapeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeStatus::InProgress => "in_progress",
            ScrapeStatus::Finished => "finished",
            ScrapeStatus::Failed => "failed",
            ScrapeStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScrapeStatus::InProgress => "In progress",
            ScrapeStatus::Finished => "Finished",
            ScrapeStatus::Failed => "Failed",
            ScrapeStatus::Unknown => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeType {
    #[default]
    Auto,
    Manual,
}

impl ScrapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeType::Auto => "auto",
            ScrapeType::Manual => "manual",
        }
    }
}

/// One run of a scraper, as reported by `/scraping-history/summary`.
///
/// Every numeric field may be missing on the wire; missing values are
/// "unknown", never zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeHistoryEntry {
    #[serde(default)]
    pub id: i64,
    #[serde(default, with = "lenient_time")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_time")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ScrapeStatus,
    #[serde(default, with = "lenient_int")]
    pub created_items: Option<i64>,
    #[serde(default, with = "lenient_int")]
    pub updated_items: Option<i64>,
    #[serde(default, with = "lenient_int")]
    pub total_items: Option<i64>,
    #[serde(default, with = "lenient_float")]
    pub progress: Option<f64>,
    #[serde(default, with = "lenient_float")]
    pub rate_per_minute: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: ScrapeType,
    #[serde(default, with = "lenient_time")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ScrapeHistoryEntry {
    /// Created plus updated items, unknown counts treated as zero.
    pub fn scanned_items(&self) -> i64 {
        self.created_items.unwrap_or(0) + self.updated_items.unwrap_or(0)
    }

    pub fn is_running(&self) -> bool {
        self.status == ScrapeStatus::InProgress
    }
}

/// A named scraper with its run history, most recent run first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperSummary {
    pub name: String,
    #[serde(default)]
    pub history: Vec<ScrapeHistoryEntry>,
}

impl ScraperSummary {
    /// The run representing the scraper's current status.
    pub fn current(&self) -> Option<&ScrapeHistoryEntry> {
        self.history.first()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// Offset-paginated response envelope used by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub has_next_page: bool,
}

impl<T> Page<T> {
    /// Offset of the following page, if there is one.
    pub fn next_offset(&self) -> Option<u64> {
        self.has_next_page
            .then(|| self.offset + self.items.len() as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub old_price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub is_on_sale: bool,
    #[serde(default)]
    pub is_favourite: bool,
    #[serde(default, with = "lenient_time")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Percentage saved relative to the previous price.
    pub fn discount_percent(&self) -> Option<f64> {
        let (price, old) = (self.price?, self.old_price?);
        (old > 0.0 && price < old).then(|| (old - price) / old * 100.0)
    }
}

/// Brand, category, color or source entry used to populate selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedItem {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub price: f64,
    #[serde(default, with = "lenient_time")]
    pub recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistory {
    #[serde(default)]
    pub product_id: i64,
    #[serde(default)]
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn lowest(&self) -> Option<f64> {
        self.points.iter().map(|p| p.price).reduce(f64::min)
    }

    pub fn highest(&self) -> Option<f64> {
        self.points.iter().map(|p| p.price).reduce(f64::max)
    }

    /// Difference between the last two recorded prices.
    pub fn latest_change(&self) -> Option<f64> {
        let [.., prev, last] = self.points.as_slice() else {
            return None;
        };
        Some(last.price - prev.price)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Saved Filters, Notifications, Search Parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilterSet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub filters: FilterSelection,
    #[serde(default, with = "lenient_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_time")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of a saved filter create/update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSavedFilterSet {
    pub name: String,
    pub filters: FilterSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub is_seen: bool,
    #[serde(default, with = "lenient_time")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnseenCount {
    #[serde(default)]
    pub count: u64,
}

/// Structured constraints extracted from free text by `/search/parse`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub brand: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub color: Vec<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub price_from: Option<f64>,
    #[serde(default)]
    pub price_to: Option<f64>,
    #[serde(default)]
    pub is_on_sale: Option<bool>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        is_admin_role(self.role.as_deref())
    }
}

/// Claims carried in the session token payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    /// Expiry, seconds since the epoch
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Whether a role name grants admin access. Case-insensitive.
pub fn is_admin_role(role: Option<&str>) -> bool {
    role.is_some_and(|r| r.trim().eq_ignore_ascii_case("admin"))
}

impl TokenClaims {
    pub fn grants_admin(&self) -> bool {
        self.is_admin || is_admin_role(self.role.as_deref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin Statistics
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTotals {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub on_sale: u64,
    #[serde(default)]
    pub with_price_change: u64,
}

/// A labelled count (products per source, brand, category or day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBucket {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiselect_wire_forms() {
        let all: MultiSelect = serde_json::from_str("\"All\"").unwrap();
        assert!(all.is_all());

        let empty: MultiSelect = serde_json::from_str("[]").unwrap();
        assert!(empty.is_all());

        let with_sentinel: MultiSelect = serde_json::from_str("[\"Nike\", \"All\"]").unwrap();
        assert!(with_sentinel.is_all());

        let single: MultiSelect = serde_json::from_str("\"Nike\"").unwrap();
        assert_eq!(single.values(), ["Nike".to_string()]);

        assert_eq!(serde_json::to_string(&MultiSelect::All).unwrap(), "\"All\"");
    }

    #[test]
    fn test_multiselect_toggle_reverts_to_all() {
        let mut select = MultiSelect::All;
        select.toggle("Nike");
        select.toggle("Zara");
        assert_eq!(select.values().len(), 2);

        select.toggle("Nike");
        select.toggle("Zara");
        assert!(select.is_all());
    }

    #[test]
    fn test_filter_selection_defaults() {
        let selection: FilterSelection = serde_json::from_str("{}").unwrap();
        assert_eq!(selection, FilterSelection::default());
        assert_eq!(selection.gender, Gender::Men);
        assert_eq!(selection.sort, SortMode::Relevance);
        assert!(selection.price_range.is_all());
        assert_eq!(selection.active_constraints(), 0);
    }

    #[test]
    fn test_history_entry_tolerates_missing_and_bad_fields() {
        let json = r#"{
            "id": 7,
            "startTime": "2025-03-01T10:00:00Z",
            "endTime": "not a date",
            "status": "paused",
            "createdItems": 10,
            "type": "manual"
        }"#;
        let entry: ScrapeHistoryEntry = serde_json::from_str(json).unwrap();
        assert!(entry.start_time.is_some());
        assert!(entry.end_time.is_none());
        assert_eq!(entry.status, ScrapeStatus::Unknown);
        assert_eq!(entry.rate_per_minute, None);
        assert_eq!(entry.scanned_items(), 10);
        assert_eq!(entry.kind, ScrapeType::Manual);
    }

    #[test]
    fn test_summaries_survive_malformed_numbers() {
        let json = r#"[
            {"name": "Nike", "history": [{
                "id": 1,
                "status": "in_progress",
                "progress": "40",
                "totalItems": 1200.0,
                "createdItems": "12",
                "updatedItems": {"n": 3},
                "ratePerMinute": "fast"
            }]},
            {"name": "Zara", "history": []}
        ]"#;
        let summaries: Vec<ScraperSummary> = serde_json::from_str(json).unwrap();
        assert_eq!(summaries.len(), 2);

        let run = &summaries[0].history[0];
        assert_eq!(run.progress, Some(40.0));
        assert_eq!(run.total_items, Some(1200));
        assert_eq!(run.created_items, Some(12));
        assert_eq!(run.updated_items, None);
        assert_eq!(run.rate_per_minute, None);
        assert_eq!(run.scanned_items(), 12);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-03-01T10:00:00.123Z").is_some());
        assert!(parse_timestamp("2025-03-01 10:00:00").is_some());
        assert!(parse_timestamp("1740823200000").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_admin_role_agrees_for_profile_and_claims() {
        let user = AuthUser {
            id: 1,
            email: "ops@example.com".into(),
            name: None,
            role: Some("Admin".into()),
        };
        let claims = TokenClaims {
            role: Some("Admin".into()),
            ..Default::default()
        };
        assert!(user.is_admin());
        assert!(claims.grants_admin());

        let shopper = AuthUser { role: Some("user".into()), ..user };
        assert!(!shopper.is_admin());
        assert!(!is_admin_role(None));
    }

    #[test]
    fn test_price_presets_have_one_all_entry() {
        let presets = PriceRange::presets();
        assert_eq!(presets.iter().filter(|p| p.is_all()).count(), 1);

        let mut labels: Vec<&str> = presets.iter().map(|p| p.label.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), presets.len());
    }

    #[test]
    fn test_price_range_contains() {
        let under = PriceRange::new("Under 50", None, Some(50.0));
        assert!(under.contains(10.0));
        assert!(!under.contains(60.0));
        assert!(PriceRange::all().contains(10_000.0));
    }

    #[test]
    fn test_price_history_change() {
        let history = PriceHistory {
            product_id: 1,
            points: vec![
                PricePoint { price: 80.0, recorded_at: None },
                PricePoint { price: 60.0, recorded_at: None },
            ],
        };
        assert_eq!(history.latest_change(), Some(-20.0));
        assert_eq!(history.lowest(), Some(60.0));
    }
}
