//! Per-table and per-entity view state (sort, search, expansion).

use hashbrown::HashMap;
use std::hash::Hash;

use super::sort::{ResetPolicy, SortState};

/// State of a single top-level table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState<K> {
    pub sort: SortState<K>,
    pub search: String,
    seed: SortState<K>,
    policy: ResetPolicy<K>,
}

impl<K: Copy + PartialEq> TableState<K> {
    pub fn new(seed: SortState<K>, policy: ResetPolicy<K>) -> Self {
        Self {
            sort: seed,
            search: String::new(),
            seed,
            policy,
        }
    }

    pub fn handle_sort(&mut self, key: K) {
        self.sort.handle_sort(key, &self.policy);
    }

    pub fn policy(&self) -> &ResetPolicy<K> {
        &self.policy
    }

    /// Return to the seeded sort (view switched back to this table).
    pub fn reset_sort(&mut self) {
        self.sort = self.seed;
    }
}

/// Expansion flags, scoped search strings and detail-table sort states,
/// keyed by a stable entity id (scraper name, source id).
#[derive(Debug, Clone)]
pub struct TableViewState<Id, K> {
    expanded: HashMap<Id, bool>,
    searches: HashMap<Id, String>,
    sorts: HashMap<Id, SortState<K>>,
    seed: SortState<K>,
    policy: ResetPolicy<K>,
}

impl<Id, K> TableViewState<Id, K>
where
    Id: Eq + Hash + Clone,
    K: Copy + PartialEq,
{
    /// `seed` is applied to an entity's detail table the first time it is
    /// expanded; `policy` governs its header clicks afterwards.
    pub fn new(seed: SortState<K>, policy: ResetPolicy<K>) -> Self {
        Self {
            expanded: HashMap::new(),
            searches: HashMap::new(),
            sorts: HashMap::new(),
            seed,
            policy,
        }
    }

    /// Flip one entity's expansion flag, returning the new value.
    pub fn toggle_expanded(&mut self, id: &Id) -> bool {
        let first_time = !self.expanded.contains_key(id);
        let flag = self.expanded.entry(id.clone()).or_insert(false);
        *flag = !*flag;
        let now_expanded = *flag;

        if first_time && now_expanded {
            self.sorts.insert(id.clone(), self.seed);
        }
        now_expanded
    }

    pub fn is_expanded(&self, id: &Id) -> bool {
        self.expanded.get(id).copied().unwrap_or(false)
    }

    pub fn expanded_ids(&self) -> impl Iterator<Item = &Id> {
        self.expanded
            .iter()
            .filter_map(|(id, open)| open.then_some(id))
    }

    pub fn collapse_all(&mut self) {
        for flag in self.expanded.values_mut() {
            *flag = false;
        }
    }

    pub fn set_search(&mut self, id: &Id, query: impl Into<String>) {
        self.searches.insert(id.clone(), query.into());
    }

    pub fn search(&self, id: &Id) -> &str {
        self.searches.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn sort_state(&self, id: &Id) -> SortState<K> {
        self.sorts.get(id).copied().unwrap_or(self.seed)
    }

    pub fn handle_sort(&mut self, id: &Id, key: K) {
        let seed = self.seed;
        self.sorts
            .entry(id.clone())
            .or_insert(seed)
            .handle_sort(key, &self.policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SortDirection;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Col {
        Name,
        Started,
    }

    fn view() -> TableViewState<String, Col> {
        TableViewState::new(
            SortState::sorted(Col::Started, SortDirection::Desc),
            ResetPolicy::Unsorted,
        )
    }

    #[test]
    fn test_toggle_flips_only_one_entity() {
        let mut view = view();
        let nike = "nike".to_string();
        let zara = "zara".to_string();

        assert!(view.toggle_expanded(&nike));
        assert!(view.is_expanded(&nike));
        assert!(!view.is_expanded(&zara));

        assert!(!view.toggle_expanded(&nike));
        assert!(!view.is_expanded(&nike));
    }

    #[test]
    fn test_first_expansion_seeds_sort() {
        let mut view = view();
        let nike = "nike".to_string();
        view.toggle_expanded(&nike);
        assert_eq!(view.sort_state(&nike).key(), Some(Col::Started));
        assert_eq!(view.sort_state(&nike).direction(), Some(SortDirection::Desc));

        // A user sort survives collapse and re-expansion
        view.handle_sort(&nike, Col::Name);
        view.toggle_expanded(&nike);
        view.toggle_expanded(&nike);
        assert_eq!(view.sort_state(&nike).key(), Some(Col::Name));
    }

    #[test]
    fn test_scoped_search() {
        let mut view = view();
        let nike = "nike".to_string();
        view.set_search(&nike, "fail");
        assert_eq!(view.search(&nike), "fail");
        assert_eq!(view.search(&"zara".to_string()), "");
    }

    #[test]
    fn test_table_state_reset() {
        let mut table = TableState::new(
            SortState::sorted(Col::Started, SortDirection::Desc),
            ResetPolicy::Fixed(Col::Started, SortDirection::Desc),
        );
        table.handle_sort(Col::Name);
        assert_eq!(table.sort.key(), Some(Col::Name));
        table.reset_sort();
        assert_eq!(table.sort.key(), Some(Col::Started));
    }
}
