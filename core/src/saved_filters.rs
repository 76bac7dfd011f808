//! Local mirror of the user's saved filter sets

use buysearch_types::{NewSavedFilterSet, SavedFilterSet};

use crate::filters::{FilterAction, FilterStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedFilters {
    sets: Vec<SavedFilterSet>,
}

impl SavedFilters {
    pub fn new(sets: Vec<SavedFilterSet>) -> Self {
        let mut saved = Self { sets: Vec::new() };
        for set in sets {
            saved.upsert(set);
        }
        saved
    }

    pub fn sets(&self) -> &[SavedFilterSet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&SavedFilterSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    /// Case-insensitive lookup by name.
    pub fn find_by_name(&self, name: &str) -> Option<&SavedFilterSet> {
        let name = name.trim();
        self.sets.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Insert or replace by id, keeping the list ordered by name.
    pub fn upsert(&mut self, set: SavedFilterSet) {
        match self.sets.iter_mut().find(|s| s.id == set.id) {
            Some(existing) => *existing = set,
            None => self.sets.push(set),
        }
        self.sets
            .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    }

    pub fn remove(&mut self, id: i64) -> Option<SavedFilterSet> {
        let index = self.sets.iter().position(|s| s.id == id)?;
        Some(self.sets.remove(index))
    }

    /// Replace the store's selection with a saved set. Returns false when
    /// the id is unknown or the selection already matches.
    pub fn load_into(&self, id: i64, store: &mut FilterStore) -> bool {
        match self.get(id) {
            Some(set) => store.dispatch(FilterAction::Replace(set.filters.clone())),
            None => {
                tracing::warn!(id, "saved filter set not found");
                false
            }
        }
    }

    /// Create request for the store's current selection.
    pub fn snapshot(name: &str, store: &FilterStore) -> NewSavedFilterSet {
        NewSavedFilterSet {
            name: name.trim().to_string(),
            filters: store.selection().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buysearch_types::{FilterSelection, Gender, MultiSelect};

    fn set(id: i64, name: &str, filters: FilterSelection) -> SavedFilterSet {
        SavedFilterSet {
            id,
            name: name.to_string(),
            filters,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_upsert_replaces_by_id_and_orders_by_name() {
        let mut saved = SavedFilters::new(vec![
            set(1, "sneakers", FilterSelection::default()),
            set(2, "Coats", FilterSelection::default()),
        ]);
        assert_eq!(saved.sets()[0].name, "Coats");

        saved.upsert(set(1, "Boots", FilterSelection::default()));
        let names: Vec<&str> = saved.sets().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Boots", "Coats"]);
        assert!(saved.find_by_name(" coats ").is_some());
    }

    #[test]
    fn test_load_into_store_and_snapshot() {
        let filters = FilterSelection {
            gender: Gender::Women,
            brand: MultiSelect::from_values(["Nike"]),
            ..Default::default()
        };
        let saved = SavedFilters::new(vec![set(4, "nike women", filters.clone())]);
        let mut store = FilterStore::default();

        assert!(saved.load_into(4, &mut store));
        assert_eq!(store.selection(), &filters);
        assert!(!saved.load_into(4, &mut store));
        assert!(!saved.load_into(99, &mut store));

        let request = SavedFilters::snapshot(" copy ", &store);
        assert_eq!(request.name, "copy");
        assert_eq!(request.filters, filters);
    }

    #[test]
    fn test_remove() {
        let mut saved = SavedFilters::new(vec![set(1, "a", FilterSelection::default())]);
        assert!(saved.remove(2).is_none());
        assert_eq!(saved.remove(1).map(|s| s.id), Some(1));
        assert!(saved.is_empty());
    }
}
