//! Product results grid with paging, favourites and price history.

use dioxus::prelude::*;

use buysearch_core::types::{Page, PriceHistory, Product};
use buysearch_core::{Loadable, ProductQuery};

use crate::state::use_app;
use crate::utils::format_price;

const PAGE_SIZE: u64 = 24;

#[component]
pub fn ProductList() -> Element {
    let app = use_app();
    let mut products = use_signal(Vec::<Product>::new);
    let mut status = use_signal(|| Loadable::<Page<()>>::Loading);

    // Refetch the first page whenever the selection changes
    let search_app = app.clone();
    let _ = use_resource(move || {
        let app = search_app.clone();
        let selection = app.filters.read().selection().clone();
        async move {
            status.set(Loadable::Loading);
            let ticket = app.product_fence.issue();
            let result = app.api.products(&ProductQuery::new(selection, 0, PAGE_SIZE)).await;
            let Some(result) = app.product_fence.accept(ticket, result) else {
                return;
            };
            match result {
                Ok(page) => {
                    products.set(page.items.clone());
                    status.set(Loadable::Ready(envelope(&page)));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "product search failed");
                    status.set(Loadable::Failed(e.to_string()));
                }
            }
        }
    });

    let more_app = app.clone();
    let load_more = move |_| {
        let app = more_app.clone();
        let Some(offset) = status.peek().ready().and_then(|p| p.next_offset()) else {
            return;
        };
        let selection = app.filters.peek().selection().clone();
        spawn(async move {
            let ticket = app.product_fence.issue();
            let result = app.api.products(&ProductQuery::new(selection, offset, PAGE_SIZE)).await;
            match app.product_fence.accept(ticket, result) {
                Some(Ok(page)) => {
                    products.write().extend(page.items.iter().cloned());
                    status.set(Loadable::Ready(envelope(&page)));
                }
                Some(Err(e)) => status.set(Loadable::Failed(e.to_string())),
                None => {}
            }
        });
    };

    let favourites = app.favourites.read();
    let items = products.read();
    let state = status.read().clone();

    rsx! {
        section { class: "product-list",
            {
                match state {
                    Loadable::Failed(ref msg) => rsx! {
                        div { class: "error-state",
                            p { "Products could not be loaded." }
                            p { class: "hint", "{msg}" }
                        }
                    },
                    Loadable::Loading if items.is_empty() => rsx! {
                        div { class: "loading-state", "Loading products..." }
                    },
                    _ if items.is_empty() => rsx! {
                        div { class: "empty-state", "No products match these filters" }
                    },
                    _ => rsx! {
                        if let Some(page) = state.ready() {
                            p { class: "result-count", "{page.total} products" }
                        }
                        div { class: "product-grid",
                            for product in items.iter() {
                                ProductCard {
                                    key: "{product.id}",
                                    product: product.clone(),
                                    favourite: favourites.contains(product.id),
                                }
                            }
                        }
                        if state.ready().is_some_and(|p| p.has_next_page) {
                            button { class: "btn load-more", onclick: load_more, "Load more" }
                        }
                    },
                }
            }
        }
    }
}

/// Page metadata without the items (those live in the product signal).
fn envelope(page: &Page<Product>) -> Page<()> {
    Page {
        items: vec![(); page.items.len()],
        offset: page.offset,
        limit: page.limit,
        total: page.total,
        has_next_page: page.has_next_page,
    }
}

#[component]
fn ProductCard(product: Product, favourite: bool) -> Element {
    let app = use_app();
    let mut history = use_signal(|| None::<Loadable<PriceHistory>>);
    let product_id = product.id;
    let currency = product.currency.clone();

    let show_history = {
        let api = app.api.clone();
        move |_| {
            if history.peek().is_some() {
                history.set(None);
                return;
            }
            history.set(Some(Loadable::Loading));
            let api = api.clone();
            spawn(async move {
                history.set(Some(Loadable::from_result(api.price_history(product_id).await)));
            });
        }
    };

    rsx! {
        article { class: "product-card",
            if let Some(ref src) = product.image_url {
                img { src: "{src}", alt: "{product.title}", loading: "lazy" }
            }
            div { class: "product-body",
                if let Some(ref brand) = product.brand {
                    span { class: "product-brand", "{brand}" }
                }
                if let Some(ref url) = product.url {
                    a { href: "{url}", target: "_blank", rel: "noopener", "{product.title}" }
                } else {
                    span { "{product.title}" }
                }
                div { class: "product-price",
                    span { class: "price", {format_price(product.price, currency.as_deref())} }
                    if product.old_price.is_some() {
                        span { class: "old-price", {format_price(product.old_price, currency.as_deref())} }
                    }
                    if let Some(discount) = product.discount_percent() {
                        span { class: "discount", "-{discount:.0}%" }
                    }
                }
                div { class: "product-actions",
                    button {
                        class: if favourite { "btn-icon favourite active" } else { "btn-icon favourite" },
                        title: if favourite { "Remove from favourites" } else { "Add to favourites" },
                        onclick: move |_| app.toggle_favourite(product_id),
                        if favourite { "♥" } else { "♡" }
                    }
                    button { class: "btn-link", onclick: show_history, "Price history" }
                }
                {
                    match history() {
                        None => rsx! {},
                        Some(Loadable::Loading) => rsx! { p { class: "hint", "Loading history..." } },
                        Some(Loadable::Failed(_)) => rsx! { p { class: "hint", "No price history available" } },
                        Some(Loadable::Ready(h)) => rsx! {
                            ul { class: "price-history",
                                for point in h.points.iter() {
                                    li {
                                        {point.recorded_at.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_default()}
                                        {format!(" {:.2}", point.price)}
                                    }
                                }
                            }
                        },
                    }
                }
            }
        }
    }
}
