use std::collections::VecDeque;
use std::fmt;

use buysearch_types::{
    Facet, FilterSelection, Gender, MultiSelect, ParsedQuery, PriceRange, SortMode,
};

use super::codec::FilterPatch;

/// Transitions kept in the journal before the oldest are dropped.
const JOURNAL_CAPACITY: usize = 128;

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// Every way the filter selection can change.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAction {
    SetSearch(String),
    SetSort(SortMode),
    /// Add or remove one value of a multi-select dimension
    ToggleFacet(Facet, String),
    SetFacet(Facet, MultiSelect),
    ClearFacet(Facet),
    SetPriceRange(PriceRange),
    SetGender(Gender),
    SetFavouritesOnly(bool),
    SetPriceChangeOnly(bool),
    SetOnSale(Option<bool>),
    /// Constraints returned by the search-text parser
    ApplyParsedQuery(ParsedQuery),
    /// Wholesale overwrite (loading a saved filter set)
    Replace(FilterSelection),
    /// Defaults overlaid with a decoded URL fragment
    Reseed(FilterPatch),
    Reset,
}

impl FilterAction {
    pub fn name(&self) -> &'static str {
        match self {
            FilterAction::SetSearch(_) => "set_search",
            FilterAction::SetSort(_) => "set_sort",
            FilterAction::ToggleFacet(..) => "toggle_facet",
            FilterAction::SetFacet(..) => "set_facet",
            FilterAction::ClearFacet(_) => "clear_facet",
            FilterAction::SetPriceRange(_) => "set_price_range",
            FilterAction::SetGender(_) => "set_gender",
            FilterAction::SetFavouritesOnly(_) => "set_favourites_only",
            FilterAction::SetPriceChangeOnly(_) => "set_price_change_only",
            FilterAction::SetOnSale(_) => "set_on_sale",
            FilterAction::ApplyParsedQuery(_) => "apply_parsed_query",
            FilterAction::Replace(_) => "replace",
            FilterAction::Reseed(_) => "reseed",
            FilterAction::Reset => "reset",
        }
    }
}

/// Label for a price band given its bounds.
pub fn price_label(from: Option<f64>, to: Option<f64>) -> String {
    match (from, to) {
        (Some(from), Some(to)) => format!("{from} - {to}"),
        (None, Some(to)) => format!("Under {to}"),
        (Some(from), None) => format!("{from}+"),
        (None, None) => buysearch_types::ALL.to_string(),
    }
}

/// Apply one action to a selection.
pub fn reduce(selection: &mut FilterSelection, action: &FilterAction) {
    match action {
        FilterAction::SetSearch(text) => selection.search = text.clone(),
        FilterAction::SetSort(mode) => selection.sort = *mode,
        FilterAction::ToggleFacet(facet, value) => selection.facet_mut(*facet).toggle(value),
        FilterAction::SetFacet(facet, select) => *selection.facet_mut(*facet) = select.clone(),
        FilterAction::ClearFacet(facet) => *selection.facet_mut(*facet) = MultiSelect::All,
        FilterAction::SetPriceRange(range) => selection.price_range = range.clone(),
        FilterAction::SetGender(gender) => selection.gender = *gender,
        FilterAction::SetFavouritesOnly(on) => selection.is_favourite = *on,
        FilterAction::SetPriceChangeOnly(on) => selection.with_price_change = *on,
        FilterAction::SetOnSale(on) => selection.is_on_sale = *on,
        FilterAction::ApplyParsedQuery(parsed) => apply_parsed(selection, parsed),
        FilterAction::Replace(next) => *selection = next.clone(),
        FilterAction::Reseed(patch) => *selection = patch.clone().into_selection(),
        FilterAction::Reset => *selection = FilterSelection::default(),
    }
}

/// Parsed constraints replace only the dimensions the parser recognised.
fn apply_parsed(selection: &mut FilterSelection, parsed: &ParsedQuery) {
    if let Some(search) = &parsed.search {
        selection.search = search.clone();
    }
    for (facet, values) in [
        (Facet::Brand, &parsed.brand),
        (Facet::Category, &parsed.category),
        (Facet::Color, &parsed.color),
    ] {
        if !values.is_empty() {
            *selection.facet_mut(facet) = MultiSelect::from_values(values.iter().cloned());
        }
    }
    if let Some(gender) = parsed.gender {
        selection.gender = gender;
    }
    let usable = |bound: Option<f64>| bound.filter(|v| v.is_finite() && *v >= 0.0);
    let (from, to) = match (usable(parsed.price_from), usable(parsed.price_to)) {
        (Some(f), Some(t)) if f > t => (Some(t), Some(f)),
        bounds => bounds,
    };
    if from.is_some() || to.is_some() {
        selection.price_range = PriceRange::new(price_label(from, to), from, to);
    }
    if parsed.is_on_sale.is_some() {
        selection.is_on_sale = parsed.is_on_sale;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// One applied action.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTransition {
    pub revision: u64,
    pub action: FilterAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&FilterSelection) + Send + Sync>;

/// Owner of the live filter selection.
pub struct FilterStore {
    selection: FilterSelection,
    revision: u64,
    journal: VecDeque<FilterTransition>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(FilterSelection::default())
    }
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .field("journal_len", &self.journal.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl FilterStore {
    pub fn new(selection: FilterSelection) -> Self {
        Self {
            selection,
            revision: 0,
            journal: VecDeque::with_capacity(JOURNAL_CAPACITY),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Store seeded from a URL fragment, falling back to defaults.
    pub fn from_fragment(fragment: &str) -> Self {
        Self::new(super::codec::decode(fragment).into_selection())
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Incremented once per effective change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn journal(&self) -> impl Iterator<Item = &FilterTransition> {
        self.journal.iter()
    }

    /// Apply an action. Returns false (and records nothing) when the action
    /// leaves the selection unchanged.
    pub fn dispatch(&mut self, action: FilterAction) -> bool {
        let mut next = self.selection.clone();
        reduce(&mut next, &action);
        if next == self.selection {
            tracing::trace!(action = action.name(), "filter action was a no-op");
            return false;
        }

        self.selection = next;
        self.revision += 1;
        tracing::debug!(
            revision = self.revision,
            action = action.name(),
            "filter selection changed"
        );

        if self.journal.len() == JOURNAL_CAPACITY {
            self.journal.pop_front();
        }
        self.journal.push_back(FilterTransition {
            revision: self.revision,
            action,
        });

        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.selection);
        }
        true
    }

    /// Register a callback run after every effective change.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&FilterSelection) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::codec;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dispatch_records_transitions() {
        let mut store = FilterStore::default();
        assert!(store.dispatch(FilterAction::SetGender(Gender::Women)));
        assert!(store.dispatch(FilterAction::ToggleFacet(Facet::Brand, "Nike".into())));
        assert_eq!(store.revision(), 2);

        let names: Vec<_> = store.journal().map(|t| t.action.name()).collect();
        assert_eq!(names, vec!["set_gender", "toggle_facet"]);
        assert_eq!(store.selection().brand.values(), ["Nike".to_string()]);
    }

    #[test]
    fn test_noop_is_not_recorded() {
        let mut store = FilterStore::default();
        assert!(!store.dispatch(FilterAction::SetGender(Gender::Men)));
        assert!(!store.dispatch(FilterAction::ClearFacet(Facet::Color)));
        assert_eq!(store.revision(), 0);
        assert_eq!(store.journal().count(), 0);
    }

    #[test]
    fn test_subscribers_see_each_change() {
        let mut store = FilterStore::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |sel| sink.lock().unwrap().push(sel.search.clone()));

        store.dispatch(FilterAction::SetSearch("boots".into()));
        store.dispatch(FilterAction::SetSearch("boots".into()));
        store.dispatch(FilterAction::SetSearch("sneakers".into()));
        assert_eq!(*seen.lock().unwrap(), vec!["boots", "sneakers"]);

        assert!(store.unsubscribe(id));
        store.dispatch(FilterAction::Reset);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_journal_is_bounded() {
        let mut store = FilterStore::default();
        for i in 0..(JOURNAL_CAPACITY + 10) {
            store.dispatch(FilterAction::SetSearch(format!("q{i}")));
        }
        assert_eq!(store.journal().count(), JOURNAL_CAPACITY);
        assert_eq!(store.journal().next().unwrap().revision, 11);
    }

    #[test]
    fn test_parsed_query_only_touches_recognised_dimensions() {
        let mut store = FilterStore::default();
        store.dispatch(FilterAction::ToggleFacet(Facet::Source, "zalando".into()));
        store.dispatch(FilterAction::ApplyParsedQuery(ParsedQuery {
            search: Some("running shoes".into()),
            brand: vec!["Nike".into()],
            gender: Some(Gender::Women),
            price_to: Some(100.0),
            ..Default::default()
        }));

        let sel = store.selection();
        assert_eq!(sel.search, "running shoes");
        assert_eq!(sel.brand.values(), ["Nike".to_string()]);
        assert_eq!(sel.gender, Gender::Women);
        assert_eq!(sel.price_range.label, "Under 100");
        assert_eq!(sel.price_range.to, Some(100.0));
        assert!(sel.category.is_all());
        assert_eq!(sel.source.values(), ["zalando".to_string()]);
    }

    #[test]
    fn test_parsed_price_bounds_are_normalised() {
        let mut store = FilterStore::default();
        store.dispatch(FilterAction::ApplyParsedQuery(ParsedQuery {
            price_from: Some(200.0),
            price_to: Some(100.0),
            ..Default::default()
        }));
        let range = &store.selection().price_range;
        assert_eq!((range.from, range.to), (Some(100.0), Some(200.0)));

        let reloaded = codec::decode(&codec::encode(store.selection())).into_selection();
        assert_eq!(&reloaded, store.selection());

        store.dispatch(FilterAction::ApplyParsedQuery(ParsedQuery {
            price_from: Some(f64::NAN),
            price_to: Some(-5.0),
            ..Default::default()
        }));
        assert_eq!(range_bounds(&store), (Some(100.0), Some(200.0)));
    }

    fn range_bounds(store: &FilterStore) -> (Option<f64>, Option<f64>) {
        let range = &store.selection().price_range;
        (range.from, range.to)
    }

    #[test]
    fn test_replace_and_reset() {
        let mut store = FilterStore::default();
        let mut saved = FilterSelection::default();
        saved.is_favourite = true;
        saved.color = MultiSelect::from_values(["Red"]);

        store.dispatch(FilterAction::Replace(saved.clone()));
        assert_eq!(store.selection(), &saved);

        store.dispatch(FilterAction::Reset);
        assert_eq!(store.selection(), &FilterSelection::default());
    }
}
