use buysearch_types::{CountBucket, ProductTotals};

use crate::loadable::Loadable;

/// Admin statistics, one independently loading panel per endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminStats {
    pub products: Loadable<ProductTotals>,
    pub sources: Loadable<Vec<CountBucket>>,
    pub brands: Loadable<Vec<CountBucket>>,
    pub categories: Loadable<Vec<CountBucket>>,
    pub price_changes: Loadable<Vec<CountBucket>>,
}

impl AdminStats {
    /// Number of panels still waiting on their request.
    pub fn pending(&self) -> usize {
        [
            self.products.is_loading(),
            self.sources.is_loading(),
            self.brands.is_loading(),
            self.categories.is_loading(),
            self.price_changes.is_loading(),
        ]
        .into_iter()
        .filter(|loading| *loading)
        .count()
    }

    pub fn failures(&self) -> Vec<(&'static str, &str)> {
        [
            ("products", self.products.error()),
            ("sources", self.sources.error()),
            ("brands", self.brands.error()),
            ("categories", self.categories.error()),
            ("price changes", self.price_changes.error()),
        ]
        .into_iter()
        .filter_map(|(panel, err)| err.map(|e| (panel, e)))
        .collect()
    }
}

/// Sort buckets largest first, then by name, keeping the top `limit`.
pub fn top_buckets(buckets: &[CountBucket], limit: usize) -> Vec<CountBucket> {
    let mut sorted = buckets.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(name: &str, count: u64) -> CountBucket {
        CountBucket {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_panels_resolve_independently() {
        let mut stats = AdminStats::default();
        assert_eq!(stats.pending(), 5);

        stats.brands = Loadable::Failed("503".into());
        stats.products = Loadable::Ready(ProductTotals::default());
        assert_eq!(stats.pending(), 3);
        assert_eq!(stats.failures(), vec![("brands", "503")]);
    }

    #[test]
    fn test_top_buckets() {
        let buckets = vec![bucket("Zara", 4), bucket("Asos", 9), bucket("Nike", 4)];
        let top = top_buckets(&buckets, 2);
        assert_eq!(top, vec![bucket("Asos", 9), bucket("Nike", 4)]);
    }
}
