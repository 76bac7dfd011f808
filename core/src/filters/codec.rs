//! Filter selection ↔ URL fragment codec
//!
//! Fragment layout (`#?` prefix, `&`-separated pairs):
//!
//! ```text
//! #?search=red%20boots&sort=PriceAsc&brand=Nike,Zara&category=All&color=All
//!   &priceRange=Under%2050:-50&gender=women&isFavourite=true
//!   &withPriceChange=false&source=All&isOnSale=true
//! ```
//!
//! Multi-valued fields are comma-joined with each item percent-encoded, so
//! commas inside a value survive. The price range is `label:from-to` with an
//! empty side for an open bound, or `All`. Decoding never fails: unknown keys
//! are skipped and malformed values leave that field at its default.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use buysearch_types::{ALL, FilterSelection, Gender, MultiSelect, PriceRange, SortMode};

pub const FRAGMENT_PREFIX: &str = "#?";

/// Characters left readable inside a component. Separators (`,` `:` `&` `=`)
/// are always escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Fields recovered from a fragment. `None` means "not present or not
/// understood"; the field keeps its default when applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub sort: Option<SortMode>,
    pub brand: Option<MultiSelect>,
    pub category: Option<MultiSelect>,
    pub color: Option<MultiSelect>,
    pub price_range: Option<PriceRange>,
    pub gender: Option<Gender>,
    pub is_favourite: Option<bool>,
    pub with_price_change: Option<bool>,
    pub source: Option<MultiSelect>,
    pub is_on_sale: Option<bool>,
}

impl FilterPatch {
    pub fn is_empty(&self) -> bool {
        *self == FilterPatch::default()
    }

    /// Overlay the recovered fields onto `selection`.
    pub fn apply_to(self, selection: &mut FilterSelection) {
        if let Some(search) = self.search {
            selection.search = search;
        }
        if let Some(sort) = self.sort {
            selection.sort = sort;
        }
        if let Some(brand) = self.brand {
            selection.brand = brand;
        }
        if let Some(category) = self.category {
            selection.category = category;
        }
        if let Some(color) = self.color {
            selection.color = color;
        }
        if let Some(range) = self.price_range {
            selection.price_range = range;
        }
        if let Some(gender) = self.gender {
            selection.gender = gender;
        }
        if let Some(on) = self.is_favourite {
            selection.is_favourite = on;
        }
        if let Some(on) = self.with_price_change {
            selection.with_price_change = on;
        }
        if let Some(source) = self.source {
            selection.source = source;
        }
        if self.is_on_sale.is_some() {
            selection.is_on_sale = self.is_on_sale;
        }
    }

    /// Defaults overlaid with this patch.
    pub fn into_selection(self) -> FilterSelection {
        let mut selection = FilterSelection::default();
        self.apply_to(&mut selection);
        selection
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding
// ─────────────────────────────────────────────────────────────────────────────

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn encode_select(select: &MultiSelect) -> String {
    match select {
        MultiSelect::All => ALL.to_string(),
        MultiSelect::Values(values) => values
            .iter()
            .map(|v| encode_component(v))
            .collect::<Vec<_>>()
            .join(","),
    }
}

fn encode_bound(bound: Option<f64>) -> String {
    bound.map(|b| b.to_string()).unwrap_or_default()
}

fn encode_price_range(range: &PriceRange) -> String {
    if range.is_all() {
        return ALL.to_string();
    }
    format!(
        "{}:{}-{}",
        encode_component(range.label.trim()),
        encode_bound(range.from),
        encode_bound(range.to)
    )
}

/// Serialize a selection to a query string (without the `#?` prefix).
pub fn encode(selection: &FilterSelection) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::with_capacity(11);

    if !selection.search.is_empty() {
        pairs.push(("search", encode_component(&selection.search)));
    }
    pairs.push(("sort", selection.sort.as_str().to_string()));
    pairs.push(("brand", encode_select(&selection.brand)));
    pairs.push(("category", encode_select(&selection.category)));
    pairs.push(("color", encode_select(&selection.color)));
    pairs.push(("priceRange", encode_price_range(&selection.price_range)));
    pairs.push(("gender", selection.gender.as_str().to_string()));
    pairs.push(("isFavourite", selection.is_favourite.to_string()));
    pairs.push(("withPriceChange", selection.with_price_change.to_string()));
    pairs.push(("source", encode_select(&selection.source)));
    if let Some(on_sale) = selection.is_on_sale {
        pairs.push(("isOnSale", on_sale.to_string()));
    }

    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Serialize a selection as a location fragment (`#?...`).
pub fn to_fragment(selection: &FilterSelection) -> String {
    format!("{FRAGMENT_PREFIX}{}", encode(selection))
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────────────────────────

fn decode_component(value: &str) -> String {
    let value = value.replace('+', " ");
    percent_decode_str(&value).decode_utf8_lossy().into_owned()
}

fn decode_select(value: &str) -> MultiSelect {
    MultiSelect::from_values(value.split(',').map(decode_component))
}

fn decode_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn decode_bound(raw: &str) -> Result<Option<f64>, ()> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(()),
    }
}

fn decode_price_range(value: &str) -> Option<PriceRange> {
    if value.is_empty() || value == ALL {
        return Some(PriceRange::all());
    }
    let (label, bounds) = value.rsplit_once(':')?;
    let label = decode_component(label);
    if label.trim().is_empty() || label.trim() == ALL {
        return Some(PriceRange::all());
    }
    let (from, to) = bounds.split_once('-')?;
    let from = decode_bound(from).ok()?;
    let to = decode_bound(to).ok()?;
    match (from, to) {
        (None, None) => None,
        (Some(f), Some(t)) if f > t => None,
        _ => Some(PriceRange::new(label.trim(), from, to)),
    }
}

/// Recover filter fields from a fragment or query string. Accepts input with
/// or without the leading `#`/`?`. Never fails.
pub fn decode(input: &str) -> FilterPatch {
    let query = input
        .trim()
        .trim_start_matches('#')
        .trim_start_matches('?');
    let mut patch = FilterPatch::default();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "search" => patch.search = Some(decode_component(value)),
            "sort" => patch.sort = value.parse().ok(),
            "brand" => patch.brand = Some(decode_select(value)),
            "category" => patch.category = Some(decode_select(value)),
            "color" => patch.color = Some(decode_select(value)),
            "source" => patch.source = Some(decode_select(value)),
            "priceRange" => patch.price_range = decode_price_range(value),
            "gender" => patch.gender = value.parse().ok(),
            "isFavourite" => patch.is_favourite = decode_bool(value),
            "withPriceChange" => patch.with_price_change = decode_bool(value),
            "isOnSale" => patch.is_on_sale = decode_bool(value),
            other => tracing::debug!(key = other, "ignoring unknown fragment key"),
        }
    }
    patch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(selection: &FilterSelection) -> FilterSelection {
        decode(&encode(selection)).into_selection()
    }

    #[test]
    fn test_round_trip_scenario() {
        let mut selection = FilterSelection::default();
        selection.gender = Gender::Women;
        selection.is_favourite = true;
        selection.brand = MultiSelect::from_values(["Nike", "Zara"]);

        let decoded = decode(&encode(&selection));
        assert_eq!(decoded.gender, Some(Gender::Women));
        assert_eq!(decoded.is_favourite, Some(true));
        assert_eq!(
            decoded.brand.as_ref().map(|b| b.values().to_vec()),
            Some(vec!["Nike".to_string(), "Zara".to_string()])
        );
        assert_eq!(decoded.into_selection(), selection);
    }

    #[test]
    fn test_round_trip_every_field() {
        let selection = FilterSelection {
            search: "red boots, size 42: 50% off & more".to_string(),
            sort: SortMode::PriceDesc,
            brand: MultiSelect::from_values(["Dolce, Gabbana", "Zara"]),
            category: MultiSelect::from_values(["Shoes"]),
            color: MultiSelect::All,
            price_range: PriceRange::new("50 - 100", Some(50.0), Some(100.0)),
            gender: Gender::Women,
            is_favourite: false,
            with_price_change: true,
            source: MultiSelect::from_values(["zalando", "asos"]),
            is_on_sale: Some(false),
        };
        assert_eq!(round_trip(&selection), selection);
    }

    #[test]
    fn test_round_trip_open_price_ranges() {
        for range in PriceRange::presets() {
            let selection = FilterSelection {
                price_range: range.clone(),
                ..Default::default()
            };
            assert_eq!(round_trip(&selection).price_range, range);
        }

        let fractional = FilterSelection {
            price_range: PriceRange::new("Budget", None, Some(19.99)),
            ..Default::default()
        };
        assert_eq!(round_trip(&fractional), fractional);
    }

    #[test]
    fn test_defaults_round_trip() {
        let selection = FilterSelection::default();
        assert_eq!(round_trip(&selection), selection);
    }

    #[test]
    fn test_encode_layout() {
        let mut selection = FilterSelection::default();
        selection.brand = MultiSelect::from_values(["Nike", "Zara"]);
        selection.price_range = PriceRange::new("Under 50", None, Some(50.0));
        let encoded = encode(&selection);

        assert!(encoded.contains("brand=Nike,Zara"));
        assert!(encoded.contains("priceRange=Under%2050:-50"));
        assert!(encoded.contains("category=All"));
        assert!(encoded.contains("isFavourite=false"));
        assert!(!encoded.contains("isOnSale"));
        assert!(to_fragment(&selection).starts_with("#?sort="));
    }

    #[test]
    fn test_decode_is_tolerant() {
        let patch = decode("#?gender=unknown&isFavourite=yes&priceRange=garbage&bogus=1&sort=");
        assert_eq!(patch.gender, None);
        assert_eq!(patch.is_favourite, None);
        assert_eq!(patch.price_range, None);
        assert_eq!(patch.sort, None);
        assert_eq!(patch.into_selection(), FilterSelection::default());

        assert!(decode("").is_empty());
        assert!(decode("#").is_empty());
        assert!(decode("&&=&").search.is_none());
    }

    #[test]
    fn test_decode_rejects_inverted_price_bounds() {
        assert_eq!(decode("priceRange=X:100-50").price_range, None);
        assert_eq!(decode("priceRange=X:-").price_range, None);
        assert_eq!(decode("priceRange=X:abc-5").price_range, None);
        assert_eq!(
            decode("priceRange=All").price_range,
            Some(PriceRange::all())
        );
    }

    #[test]
    fn test_decode_without_prefix_and_plus_spaces() {
        let patch = decode("search=red+boots&brand=All");
        assert_eq!(patch.search.as_deref(), Some("red boots"));
        assert_eq!(patch.brand, Some(MultiSelect::All));
    }
}
