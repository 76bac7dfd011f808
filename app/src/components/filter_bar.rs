//! Search box and filter controls

use dioxus::prelude::*;

use buysearch_core::FilterAction;
use buysearch_core::types::{Facet, Gender, NamedItem, PriceRange, SortMode};

use crate::components::use_toast;
use crate::state::use_app;

#[component]
pub fn FilterBar() -> Element {
    let app = use_app();
    let mut toasts = use_toast();
    let selection = app.filters.read().selection().clone();
    let mut draft = use_signal(|| selection.search.clone());

    let submit_app = app.clone();
    let submit = move |_| {
        let app = submit_app.clone();
        let text = draft.peek().trim().to_string();
        app.dispatch(FilterAction::SetSearch(text.clone()));
        if text.is_empty() {
            return;
        }
        // Parser output may arrive after newer input; only the latest applies
        spawn(async move {
            let ticket = app.parse_fence.issue();
            let result = app.api.parse_search(&text).await;
            match app.parse_fence.accept(ticket, result) {
                Some(Ok(parsed)) => app.dispatch(FilterAction::ApplyParsedQuery(parsed)),
                Some(Err(e)) => tracing::debug!(error = %e, "search parser unavailable"),
                None => {}
            }
        });
    };

    let sort_app = app.clone();
    let gender_app = app.clone();
    let price_app = app.clone();
    let fav_app = app.clone();
    let change_app = app.clone();
    let sale_app = app.clone();
    let reset_app = app.clone();
    let price_label = selection.price_range.label.clone();
    let on_sale_value = match selection.is_on_sale {
        None => "any",
        Some(true) => "yes",
        Some(false) => "no",
    };

    rsx! {
        section { class: "filter-bar",
            form {
                class: "search-row",
                onsubmit: move |e: FormEvent| {
                    e.prevent_default();
                    submit(());
                },
                input {
                    r#type: "search",
                    placeholder: "Search products, e.g. \"red nike sneakers under 100\"",
                    value: "{draft}",
                    oninput: move |e: FormEvent| draft.set(e.value()),
                }
                button { r#type: "submit", class: "btn", "Search" }
            }

            div { class: "filter-row",
                select {
                    value: selection.sort.as_str(),
                    onchange: move |e: FormEvent| match e.value().parse::<SortMode>() {
                        Ok(mode) => sort_app.dispatch(FilterAction::SetSort(mode)),
                        Err(err) => toasts.error(err),
                    },
                    for mode in SortMode::all() {
                        option { value: mode.as_str(), "{mode.label()}" }
                    }
                }
                div { class: "gender-toggle",
                    for gender in [Gender::Men, Gender::Women] {
                        button {
                            class: if selection.gender == gender { "btn active" } else { "btn" },
                            onclick: {
                                let app = gender_app.clone();
                                move |_| app.dispatch(FilterAction::SetGender(gender))
                            },
                            "{gender.as_str()}"
                        }
                    }
                }
                select {
                    value: "{price_label}",
                    onchange: move |e: FormEvent| {
                        let label = e.value();
                        let range = PriceRange::presets()
                            .into_iter()
                            .find(|p| p.label == label)
                            .unwrap_or_else(PriceRange::all);
                        price_app.dispatch(FilterAction::SetPriceRange(range));
                    },
                    for preset in PriceRange::presets() {
                        option {
                            value: "{preset.label}",
                            if preset.is_all() { "Any price" } else { "{preset.label}" }
                        }
                    }
                }
                label {
                    input {
                        r#type: "checkbox",
                        checked: selection.is_favourite,
                        onchange: move |e: FormEvent| {
                            fav_app.dispatch(FilterAction::SetFavouritesOnly(e.checked()))
                        },
                    }
                    " Favourites"
                }
                label {
                    input {
                        r#type: "checkbox",
                        checked: selection.with_price_change,
                        onchange: move |e: FormEvent| {
                            change_app.dispatch(FilterAction::SetPriceChangeOnly(e.checked()))
                        },
                    }
                    " Price changed"
                }
                select {
                    value: on_sale_value,
                    onchange: move |e: FormEvent| {
                        let on_sale = match e.value().as_str() {
                            "yes" => Some(true),
                            "no" => Some(false),
                            _ => None,
                        };
                        sale_app.dispatch(FilterAction::SetOnSale(on_sale));
                    },
                    option { value: "any", "Sale: any" }
                    option { value: "yes", "On sale" }
                    option { value: "no", "Full price" }
                }
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| {
                        draft.set(String::new());
                        reset_app.dispatch(FilterAction::Reset);
                    },
                    "Reset"
                }
            }

            div { class: "facets",
                for facet in Facet::all().iter().copied() {
                    FacetChips { key: "{facet.key()}", facet }
                }
            }
        }
    }
}

/// One facet selector. Each facet loads its options on its own; a failed
/// list just leaves the selector empty.
#[component]
fn FacetChips(facet: Facet) -> Element {
    let app = use_app();
    let options_api = app.api.clone();
    let options = use_resource(move || {
        let api = options_api.clone();
        async move {
            let result = match facet {
                Facet::Brand => api.brands().await,
                Facet::Category => api.categories().await,
                Facet::Color => api.colors().await,
                Facet::Source => api.sources().await,
            };
            result.unwrap_or_else(|e| {
                tracing::warn!(facet = facet.key(), error = %e, "facet list unavailable");
                Vec::new()
            })
        }
    });

    let items: Vec<NamedItem> = match &*options.read() {
        None => {
            return rsx! {
                div { class: "facet-loading", "Loading {facet.key()}..." }
            };
        }
        Some(items) if items.is_empty() => return rsx! {},
        Some(items) => items.clone(),
    };
    let select = app.filters.read().selection().facet(facet).clone();
    let clear_app = app.clone();

    rsx! {
        div { class: "facet-group",
            span { class: "facet-title", "{facet.key()}" }
            button {
                class: if select.is_all() { "chip active" } else { "chip" },
                onclick: move |_| clear_app.dispatch(FilterAction::ClearFacet(facet)),
                "All"
            }
            for item in items {
                button {
                    key: "{item.id}",
                    class: if select.contains(&item.name) { "chip active" } else { "chip" },
                    onclick: {
                        let app = app.clone();
                        let name = item.name.clone();
                        move |_| app.dispatch(FilterAction::ToggleFacet(facet, name.clone()))
                    },
                    "{item.name}"
                    if let Some(count) = item.count {
                        span { class: "chip-count", " {count}" }
                    }
                }
            }
        }
    }
}
