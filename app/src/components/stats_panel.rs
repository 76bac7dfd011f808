//! Admin statistics. Each panel loads on its own; one failing endpoint
//! never blanks the others.

use std::future::Future;

use dioxus::prelude::*;

use buysearch_core::api::top_buckets;
use buysearch_core::scrape::format::format_count;
use buysearch_core::types::CountBucket;
use buysearch_core::{AdminGate, AdminStats, ApiError, Loadable};

use crate::state::use_app;

const TOP_BUCKETS: usize = 10;

/// Run one request as a resource that settles into a `Loadable`.
fn use_panel<T, F, Fut>(fetch: F) -> Resource<Loadable<T>>
where
    T: 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<T, ApiError>> + 'static,
{
    use_resource(move || {
        let request = fetch();
        async move {
            let result = request.await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "stats panel failed");
            }
            Loadable::from_result(result)
        }
    })
}

fn settled<T: Clone>(resource: &Resource<Loadable<T>>) -> Loadable<T> {
    match &*resource.read() {
        Some(panel) => panel.clone(),
        None => Loadable::Loading,
    }
}

#[component]
pub fn StatsPanel() -> Element {
    let app = use_app();

    let api = app.api.clone();
    let totals = use_panel(move || {
        let api = api.clone();
        async move { api.product_totals().await }
    });
    let api = app.api.clone();
    let sources = use_panel(move || {
        let api = api.clone();
        async move { api.source_counts().await }
    });
    let api = app.api.clone();
    let brands = use_panel(move || {
        let api = api.clone();
        async move { api.brand_counts().await }
    });
    let api = app.api.clone();
    let categories = use_panel(move || {
        let api = api.clone();
        async move { api.category_counts().await }
    });
    let api = app.api.clone();
    let price_changes = use_panel(move || {
        let api = api.clone();
        async move { api.price_change_counts().await }
    });

    if *app.admin.read() != AdminGate::Allowed {
        return rsx! {
            div { class: "empty-state", "Statistics are only available to administrators" }
        };
    }

    let stats = AdminStats {
        products: settled(&totals),
        sources: settled(&sources),
        brands: settled(&brands),
        categories: settled(&categories),
        price_changes: settled(&price_changes),
    };
    let failed = stats.failures().len();
    let pending = stats.pending();

    rsx! {
        if failed > 0 {
            p { class: "hint error", "{failed} of 5 panels could not be loaded" }
        } else if pending > 0 {
            p { class: "hint", "Loading {pending} panels..." }
        }
        section { class: "stats-grid",
            div { class: "stats-card",
                h3 { "Products" }
                {
                    match stats.products.clone() {
                        Loadable::Loading => rsx! { p { class: "hint", "Loading..." } },
                        Loadable::Failed(msg) => rsx! { p { class: "hint error", "Unavailable: {msg}" } },
                        Loadable::Ready(t) => rsx! {
                            dl {
                                dt { "Total" }
                                dd { {format_count(Some(t.total as i64))} }
                                dt { "On sale" }
                                dd { {format_count(Some(t.on_sale as i64))} }
                                dt { "Price changed" }
                                dd { {format_count(Some(t.with_price_change as i64))} }
                            }
                        },
                    }
                }
            }
            BucketCard { title: "By source", panel: stats.sources.clone() }
            BucketCard { title: "Top brands", panel: stats.brands.clone() }
            BucketCard { title: "Top categories", panel: stats.categories.clone() }
            BucketCard { title: "Price changes", panel: stats.price_changes.clone() }
        }
    }
}

#[component]
fn BucketCard(title: &'static str, panel: Loadable<Vec<CountBucket>>) -> Element {
    rsx! {
        div { class: "stats-card",
            h3 { "{title}" }
            {
                match panel {
                    Loadable::Loading => rsx! { p { class: "hint", "Loading..." } },
                    Loadable::Failed(msg) => rsx! { p { class: "hint error", "Unavailable: {msg}" } },
                    Loadable::Ready(buckets) if buckets.is_empty() => rsx! { p { class: "hint", "No data" } },
                    Loadable::Ready(buckets) => rsx! {
                        table { class: "data-table compact",
                            tbody {
                                for bucket in top_buckets(&buckets, TOP_BUCKETS) {
                                    tr { key: "{bucket.name}",
                                        td { "{bucket.name}" }
                                        td { class: "num", {format_count(Some(bucket.count as i64))} }
                                    }
                                }
                            }
                        }
                    },
                }
            }
        }
    }
}
