use buysearch_types::{Facet, FilterSelection, MultiSelect, SortMode};

/// `/products` request parameters derived from a filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub selection: FilterSelection,
    pub offset: u64,
    pub limit: u64,
}

impl ProductQuery {
    pub fn new(selection: FilterSelection, offset: u64, limit: u64) -> Self {
        Self {
            selection,
            offset,
            limit,
        }
    }

    pub fn next_page(&self, offset: u64) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }

    /// Query parameters; unconstrained dimensions are omitted.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let sel = &self.selection;
        let mut params = Vec::new();

        let search = sel.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        if sel.sort != SortMode::Relevance {
            params.push(("sort", sel.sort.as_str().to_string()));
        }
        for facet in Facet::all() {
            if let MultiSelect::Values(values) = sel.facet(*facet) {
                params.push((facet.key(), values.join(",")));
            }
        }
        if !sel.price_range.is_all() {
            if let Some(from) = sel.price_range.from {
                params.push(("priceFrom", from.to_string()));
            }
            if let Some(to) = sel.price_range.to {
                params.push(("priceTo", to.to_string()));
            }
        }
        params.push(("gender", sel.gender.as_str().to_string()));
        if sel.is_favourite {
            params.push(("isFavourite", "true".to_string()));
        }
        if sel.with_price_change {
            params.push(("withPriceChange", "true".to_string()));
        }
        if let Some(on_sale) = sel.is_on_sale {
            params.push(("isOnSale", on_sale.to_string()));
        }
        params.push(("offset", self.offset.to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buysearch_types::PriceRange;

    fn value<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_selection_params() {
        let params = ProductQuery::new(FilterSelection::default(), 0, 24).params();
        assert_eq!(value(&params, "brand"), None);
        assert_eq!(value(&params, "sort"), None);
        assert_eq!(value(&params, "gender"), Some("men"));
        assert_eq!(value(&params, "limit"), Some("24"));
    }

    #[test]
    fn test_constrained_selection_params() {
        let selection = FilterSelection {
            search: "  boots ".into(),
            sort: SortMode::PriceAsc,
            brand: MultiSelect::from_values(["Nike", "Zara"]),
            price_range: PriceRange::new("500+", Some(500.0), None),
            is_on_sale: Some(true),
            ..Default::default()
        };
        let params = ProductQuery::new(selection, 48, 24).params();
        assert_eq!(value(&params, "search"), Some("boots"));
        assert_eq!(value(&params, "sort"), Some("PriceAsc"));
        assert_eq!(value(&params, "brand"), Some("Nike,Zara"));
        assert_eq!(value(&params, "priceFrom"), Some("500"));
        assert_eq!(value(&params, "priceTo"), None);
        assert_eq!(value(&params, "isOnSale"), Some("true"));
        assert_eq!(value(&params, "offset"), Some("48"));
    }
}
