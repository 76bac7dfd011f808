//! Plain-text tables for the shell

use buysearch_core::scrape::format::{PLACEHOLDER, format_cell, format_count, format_time};
use buysearch_core::types::{
    CountBucket, FilterSelection, Notification, Page, PriceHistory, Product, SavedFilterSet,
};
use buysearch_core::{
    AdminStats, HistoryColumn, HistoryRow, Loadable, ScraperColumn, ScraperRow, SortState,
    codec,
};

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn price(value: Option<f64>, currency: Option<&str>) -> String {
    match value {
        Some(v) => format!("{v:.2} {}", currency.unwrap_or("")).trim_end().to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Header label with an arrow on the active sort column.
fn header<K: PartialEq + Copy>(label: &str, key: K, sort: &SortState<K>) -> String {
    match sort.direction_for(key) {
        Some(dir) if dir == buysearch_core::SortDirection::Asc => format!("{label} ▲"),
        Some(_) => format!("{label} ▼"),
        None => label.to_string(),
    }
}

pub fn print_selection(selection: &FilterSelection) {
    let search = if selection.search.is_empty() {
        PLACEHOLDER
    } else {
        selection.search.as_str()
    };
    println!("search          {search}");
    println!("sort            {}", selection.sort.label());
    println!("brand           {}", selection.brand);
    println!("category        {}", selection.category);
    println!("color           {}", selection.color);
    println!("source          {}", selection.source);
    println!("price           {}", selection.price_range.label);
    println!("gender          {}", selection.gender.as_str());
    println!("favourites only {}", selection.is_favourite);
    println!("price changed   {}", selection.with_price_change);
    println!(
        "on sale         {}",
        selection.is_on_sale.map(|b| b.to_string()).unwrap_or_else(|| "any".into())
    );
    println!("active filters  {}", selection.active_constraints());
    println!("fragment        {}", codec::to_fragment(selection));
}

pub fn print_products(page: &Page<Product>) {
    if page.items.is_empty() {
        println!("No products match the current filters");
        return;
    }
    println!(
        "{:<8} {:<42} {:<14} {:>12} {:>12} {:>5} Fav",
        "Id", "Title", "Brand", "Price", "Was", "Off"
    );
    println!("{}", "-".repeat(104));
    for product in &page.items {
        let currency = product.currency.as_deref();
        println!(
            "{:<8} {:<42} {:<14} {:>12} {:>12} {:>5} {}",
            product.id,
            truncate(&product.title, 42),
            truncate(product.brand.as_deref().unwrap_or(PLACEHOLDER), 14),
            price(product.price, currency),
            price(product.old_price, currency),
            product
                .discount_percent()
                .map(|d| format!("{d:.0}%"))
                .unwrap_or_else(|| PLACEHOLDER.into()),
            if product.is_favourite { "★" } else { "" },
        );
    }
    let shown_to = page.offset + page.items.len() as u64;
    println!(
        "\n{}-{} of {}{}",
        page.offset + 1,
        shown_to,
        page.total,
        if page.has_next_page { " (more: `page`)" } else { "" }
    );
}

pub fn print_price_history(history: &PriceHistory) {
    if history.points.is_empty() {
        println!("No price history for product {}", history.product_id);
        return;
    }
    for point in &history.points {
        println!("{:<18} {:>10.2}", format_time(point.recorded_at), point.price);
    }
    println!(
        "low {}  high {}  last change {}",
        history.lowest().map(|p| format!("{p:.2}")).unwrap_or_else(|| PLACEHOLDER.into()),
        history.highest().map(|p| format!("{p:.2}")).unwrap_or_else(|| PLACEHOLDER.into()),
        history
            .latest_change()
            .map(|p| format!("{p:+.2}"))
            .unwrap_or_else(|| PLACEHOLDER.into()),
    );
}

pub fn print_saved(sets: &[SavedFilterSet]) {
    if sets.is_empty() {
        println!("No saved filter sets");
        return;
    }
    for set in sets {
        println!(
            "{:<6} {:<30} {} filters  {}",
            set.id,
            truncate(&set.name, 30),
            set.filters.active_constraints(),
            format_time(set.updated_at.or(set.created_at)),
        );
    }
}

pub fn print_notifications(page: &Page<Notification>) {
    if page.items.is_empty() {
        println!("No notifications");
        return;
    }
    for n in &page.items {
        println!(
            "{} {:<6} {:<18} {} {}",
            if n.is_seen { " " } else { "•" },
            n.id,
            format_time(n.created_at),
            n.title,
            n.message
        );
    }
}

const HISTORY_COLUMNS: [HistoryColumn; 8] = [
    HistoryColumn::StartTime,
    HistoryColumn::Status,
    HistoryColumn::ScannedItems,
    HistoryColumn::Progress,
    HistoryColumn::RatePerMinute,
    HistoryColumn::RunTime,
    HistoryColumn::Eta,
    HistoryColumn::UpdatedAt,
];

pub fn print_scrapers(rows: &[ScraperRow<'_>], sort: &SortState<ScraperColumn>) {
    if rows.is_empty() {
        println!("No scrapers match");
        return;
    }
    print!("{:<20}", header("Name", ScraperColumn::Name, sort));
    for col in HISTORY_COLUMNS {
        print!(" {:>18}", header(col.label(), ScraperColumn::Run(col), sort));
    }
    println!();
    for row in rows {
        print!("{:<20}", truncate(row.name, 20));
        for col in HISTORY_COLUMNS {
            print!(" {:>18}", format_cell(row.current, &row.metrics, col));
        }
        println!();
    }
}

pub fn print_history(rows: &[HistoryRow<'_>], sort: &SortState<HistoryColumn>) {
    if rows.is_empty() {
        println!("    (no runs)");
        return;
    }
    print!("    ");
    for col in HISTORY_COLUMNS {
        print!(" {:>18}", header(col.label(), col, sort));
    }
    println!();
    for row in rows {
        print!("    ");
        for col in HISTORY_COLUMNS {
            print!(" {:>18}", format_cell(Some(row.entry), &row.metrics, col));
        }
        println!();
    }
}

fn print_panel<T>(title: &str, panel: &Loadable<T>, body: impl FnOnce(&T)) {
    println!("== {title}");
    match panel {
        Loadable::Loading => println!("   loading..."),
        Loadable::Failed(e) => println!("   unavailable: {e}"),
        Loadable::Ready(value) => body(value),
    }
}

fn print_buckets(buckets: &[CountBucket]) {
    for bucket in buckets {
        println!("   {:<30} {:>10}", truncate(&bucket.name, 30), format_count(Some(bucket.count as i64)));
    }
}

pub fn print_stats(stats: &AdminStats, top: usize) {
    print_panel("Products", &stats.products, |totals| {
        println!("   total {}", format_count(Some(totals.total as i64)));
        println!("   on sale {}", format_count(Some(totals.on_sale as i64)));
        println!("   price changed {}", format_count(Some(totals.with_price_change as i64)));
    });
    for (title, panel) in [
        ("Sources", &stats.sources),
        ("Brands", &stats.brands),
        ("Categories", &stats.categories),
        ("Price changes", &stats.price_changes),
    ] {
        print_panel(title, panel, |buckets| {
            print_buckets(&buysearch_core::api::top_buckets(buckets, top))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Nike", 10), "Nike");
        assert_eq!(truncate("Air Max Plus", 8), "Air Max…");
    }

    #[test]
    fn test_price_cell() {
        assert_eq!(price(Some(49.5), Some("EUR")), "49.50 EUR");
        assert_eq!(price(Some(10.0), None), "10.00");
        assert_eq!(price(None, Some("EUR")), "-");
    }

    #[test]
    fn test_header_marks_active_column() {
        let sort = SortState::sorted(ScraperColumn::Name, buysearch_core::SortDirection::Desc);
        assert_eq!(header("Name", ScraperColumn::Name, &sort), "Name ▼");
        assert_eq!(
            header("Eta", ScraperColumn::Run(HistoryColumn::Eta), &sort),
            "Eta"
        );
    }
}
