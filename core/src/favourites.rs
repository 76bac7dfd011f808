//! Favourite products, mirrored from the server

use hashbrown::HashSet;

use buysearch_types::Product;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavouriteAction {
    /// Replace the whole set with a fresh server listing
    Replace(Vec<i64>),
    Add(i64),
    Remove(i64),
    Toggle(i64),
}

impl FavouriteAction {
    pub fn name(&self) -> &'static str {
        match self {
            FavouriteAction::Replace(_) => "replace",
            FavouriteAction::Add(_) => "add",
            FavouriteAction::Remove(_) => "remove",
            FavouriteAction::Toggle(_) => "toggle",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FavouritesStore {
    ids: HashSet<i64>,
    revision: u64,
}

impl FavouritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products(products: &[Product]) -> Self {
        let mut store = Self::new();
        store.dispatch(FavouriteAction::Replace(products.iter().map(|p| p.id).collect()));
        store
    }

    pub fn contains(&self, product_id: i64) -> bool {
        self.ids.contains(&product_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve a toggle into the concrete add/remove the server must see.
    pub fn resolve(&self, action: FavouriteAction) -> FavouriteAction {
        match action {
            FavouriteAction::Toggle(id) if self.contains(id) => FavouriteAction::Remove(id),
            FavouriteAction::Toggle(id) => FavouriteAction::Add(id),
            other => other,
        }
    }

    /// Apply an action; returns whether the set changed.
    pub fn dispatch(&mut self, action: FavouriteAction) -> bool {
        let name = action.name();
        let changed = match self.resolve(action) {
            FavouriteAction::Replace(ids) => {
                let next: HashSet<i64> = ids.into_iter().collect();
                let changed = next != self.ids;
                self.ids = next;
                changed
            }
            FavouriteAction::Add(id) => self.ids.insert(id),
            FavouriteAction::Remove(id) => self.ids.remove(&id),
            FavouriteAction::Toggle(_) => unreachable!("resolve never yields a toggle"),
        };
        if changed {
            self.revision += 1;
            tracing::debug!(action = name, count = self.ids.len(), "favourites changed");
        }
        changed
    }

    /// Stamp `is_favourite` on a page of products.
    pub fn mark(&self, products: &mut [Product]) {
        for product in products {
            product.is_favourite = self.contains(product.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_resolves_against_current_set() {
        let mut store = FavouritesStore::new();
        assert_eq!(store.resolve(FavouriteAction::Toggle(7)), FavouriteAction::Add(7));

        assert!(store.dispatch(FavouriteAction::Toggle(7)));
        assert!(store.contains(7));
        assert_eq!(store.resolve(FavouriteAction::Toggle(7)), FavouriteAction::Remove(7));

        assert!(store.dispatch(FavouriteAction::Toggle(7)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_noop_does_not_bump_revision() {
        let mut store = FavouritesStore::new();
        store.dispatch(FavouriteAction::Replace(vec![3, 1, 2]));
        assert_eq!(store.revision(), 1);

        assert!(!store.dispatch(FavouriteAction::Add(2)));
        assert!(!store.dispatch(FavouriteAction::Remove(9)));
        assert!(!store.dispatch(FavouriteAction::Replace(vec![2, 3, 1])));
        assert_eq!(store.revision(), 1);
        assert_eq!(store.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_mark_products() {
        let store = {
            let mut s = FavouritesStore::new();
            s.dispatch(FavouriteAction::Add(2));
            s
        };
        let mut products = vec![
            Product {
                id: 1,
                is_favourite: true,
                ..Default::default()
            },
            Product {
                id: 2,
                ..Default::default()
            },
        ];
        store.mark(&mut products);
        assert!(!products[0].is_favourite);
        assert!(products[1].is_favourite);
    }
}
