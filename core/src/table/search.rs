//! Substring search over a single text field.

/// Case-insensitive substring test. A blank query matches everything.
pub fn matches_query(haystack: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Keep rows whose `field` contains `query`, ignoring case.
///
/// Plain substring matching: no tokenising, no fuzziness. Whitespace-only
/// queries return every row in its original order.
pub fn filter_rows<R, F>(rows: Vec<R>, query: &str, field: F) -> Vec<R>
where
    F: Fn(&R) -> &str,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| field(row).to_lowercase().contains(&needle))
        .collect()
}

/// Cap the rendered row count.
pub fn truncate_rows<R>(mut rows: Vec<R>, cap: usize) -> Vec<R> {
    rows.truncate(cap);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        name: &'static str,
        status: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Nike", status: "in_progress" },
            Row { name: "Zara", status: "finished" },
        ]
    }

    #[test]
    fn test_filter_by_name() {
        let filtered = filter_rows(rows(), "ni", |r| r.name);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Nike");
        assert_eq!(filtered[0].status, "in_progress");
    }

    #[test]
    fn test_blank_query_keeps_everything() {
        assert_eq!(filter_rows(rows(), "", |r| r.name).len(), 2);
        assert_eq!(filter_rows(rows(), "   ", |r| r.name).len(), 2);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filtered = filter_rows(rows(), "ZAR", |r| r.name);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Zara");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let once = filter_rows(rows(), "a", |r| r.name);
        let once_names: Vec<_> = once.iter().map(|r| r.name).collect();
        let twice = filter_rows(once, "a", |r| r.name);
        let twice_names: Vec<_> = twice.iter().map(|r| r.name).collect();
        assert_eq!(once_names, twice_names);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_rows(vec![1, 2, 3], 2), vec![1, 2]);
        assert_eq!(truncate_rows(vec![1], 50), vec![1]);
    }
}
