//! Named filter sets stored on the server.

use dioxus::prelude::*;

use buysearch_core::SavedFilters;
use buysearch_core::codec;

use crate::components::use_toast;
use crate::state::use_app;
use crate::utils;

#[component]
pub fn SavedFiltersPanel() -> Element {
    let app = use_app();
    let mut toasts = use_toast();
    let mut name = use_signal(String::new);
    let mut saved = app.saved;

    let load_api = app.api.clone();
    let listing = use_resource(move || {
        let api = load_api.clone();
        async move {
            match api.saved_filters().await {
                Ok(sets) => {
                    saved.set(SavedFilters::new(sets));
                    Ok(())
                }
                Err(e) => Err(e.to_string()),
            }
        }
    });

    let save_app = app.clone();
    let mut on_save = move |_| {
        let app = save_app.clone();
        let label = name.peek().trim().to_string();
        if label.is_empty() {
            toasts.error("Name the filter set first");
            return;
        }
        let draft = SavedFilters::snapshot(&label, &app.filters.peek());
        // Saving under an existing name overwrites that set
        let existing = saved.peek().find_by_name(&label).map(|s| s.id);
        spawn(async move {
            let result = match existing {
                Some(id) => app.api.update_saved_filter(id, &draft).await,
                None => app.api.create_saved_filter(&draft).await,
            };
            match result {
                Ok(set) => {
                    toasts.info(format!("Saved \"{}\"", set.name));
                    saved.write().upsert(set);
                    name.set(String::new());
                }
                Err(e) => toasts.error(format!("Could not save filters: {e}")),
            }
        });
    };

    let sets = saved.read().sets().to_vec();

    rsx! {
        section { class: "saved-filters",
            h3 { "Saved filters" }
            form {
                class: "saved-form",
                onsubmit: move |e: FormEvent| {
                    e.prevent_default();
                    on_save(());
                },
                input {
                    r#type: "text",
                    placeholder: "Name this search",
                    value: "{name}",
                    oninput: move |e: FormEvent| name.set(e.value()),
                }
                button { r#type: "submit", class: "btn", "Save" }
            }
            {
                match &*listing.read() {
                    None => rsx! { p { class: "hint", "Loading..." } },
                    Some(Err(msg)) => rsx! { p { class: "hint error", "Saved filters unavailable: {msg}" } },
                    Some(Ok(())) if sets.is_empty() => rsx! { p { class: "hint", "Nothing saved yet" } },
                    Some(Ok(())) => rsx! {
                        ul { class: "saved-list",
                            for set in sets {
                                li { key: "{set.id}",
                                    button {
                                        class: "btn-link",
                                        title: format!("{} active filters", set.filters.active_constraints()),
                                        onclick: {
                                            let app = app.clone();
                                            let id = set.id;
                                            move |_| {
                                                let mut filters = app.filters;
                                                if saved.peek().load_into(id, &mut filters.write()) {
                                                    utils::replace_fragment(&codec::to_fragment(
                                                        filters.peek().selection(),
                                                    ));
                                                }
                                            }
                                        },
                                        "{set.name}"
                                    }
                                    button {
                                        class: "btn-icon",
                                        title: "Delete",
                                        onclick: {
                                            let api = app.api.clone();
                                            let id = set.id;
                                            move |_| {
                                                let api = api.clone();
                                                spawn(async move {
                                                    match api.delete_saved_filter(id).await {
                                                        Ok(()) => {
                                                            saved.write().remove(id);
                                                        }
                                                        Err(e) => toasts.error(format!("Could not delete: {e}")),
                                                    }
                                                });
                                            }
                                        },
                                        "×"
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
