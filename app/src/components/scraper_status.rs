//! Admin scraper status: one row per scraper with expandable run history.

use chrono::Utc;
use dioxus::prelude::*;

use buysearch_core::scrape::format::format_cell;
use buysearch_core::scrape::{history_rows, scraper_rows};
use buysearch_core::table::DEFAULT_ROW_CAP;
use buysearch_core::types::ScraperSummary;
use buysearch_core::{
    AdminGate, HistoryColumn, Loadable, ScrapeMetrics, ScraperColumn, TableViewState,
};

use crate::state::use_app;
use crate::utils::sort_class;

const REFRESH_MS: u32 = 10_000;

#[component]
pub fn ScraperStatusPanel() -> Element {
    let app = use_app();
    let mut summaries = use_signal(|| Loadable::<Vec<ScraperSummary>>::Loading);
    let mut table = use_signal(ScraperColumn::table_state);
    let view = use_signal(HistoryColumn::view_state::<String>);
    let mut tick = use_signal(|| 0u64);

    use_future(move || async move {
        loop {
            gloo_timers::future::TimeoutFuture::new(REFRESH_MS).await;
            tick += 1;
        }
    });

    let fetch_app = app.clone();
    let _ = use_resource(move || {
        let app = fetch_app.clone();
        let _ = tick();
        let allowed = app.admin.read().is_allowed();
        async move {
            if !allowed {
                return;
            }
            let result = app.api.scraping_summary().await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "scraper summary failed");
            }
            // Keep showing the last good data if a refresh fails
            if result.is_ok() || !summaries.peek().is_settled() {
                summaries.set(Loadable::from_result(result));
            }
        }
    });

    match *app.admin.read() {
        AdminGate::Pending => return rsx! { p { class: "hint", "Checking access..." } },
        AdminGate::Denied => {
            return rsx! {
                div { class: "empty-state", "Scraper status is only available to administrators" }
            };
        }
        AdminGate::Allowed => {}
    }

    let data = summaries.read();
    let list = match &*data {
        Loadable::Loading => return rsx! { p { class: "hint", "Loading scrapers..." } },
        Loadable::Failed(msg) => {
            return rsx! {
                div { class: "error-state",
                    p { "Scraper status could not be loaded." }
                    p { class: "hint", "{msg}" }
                }
            };
        }
        Loadable::Ready(list) => list,
    };

    let now = Utc::now();
    let state = table.read().clone();
    let rows = scraper_rows(list, &state, now, DEFAULT_ROW_CAP);
    let columns = HistoryColumn::all();
    let span = columns.len() + 2;
    let shown = format!("{} of {} scrapers", rows.len(), list.len());

    rsx! {
        section { class: "scraper-status",
            div { class: "table-toolbar",
                input {
                    r#type: "search",
                    placeholder: "Filter scrapers by name",
                    value: "{state.search}",
                    oninput: move |e: FormEvent| table.write().search = e.value(),
                }
                span { class: "hint", "{shown}" }
            }
            table { class: "data-table",
                thead {
                    tr {
                        th { class: "expand-col" }
                        SortHeader {
                            label: ScraperColumn::Name.label(),
                            class: sort_class(&state.sort, ScraperColumn::Name),
                            onsort: move |_| table.write().handle_sort(ScraperColumn::Name),
                        }
                        for col in columns.iter().copied() {
                            SortHeader {
                                key: "{col.key()}",
                                label: col.label(),
                                class: sort_class(&state.sort, ScraperColumn::Run(col)),
                                onsort: move |_| table.write().handle_sort(ScraperColumn::Run(col)),
                            }
                        }
                    }
                }
                tbody {
                    if rows.is_empty() {
                        tr {
                            td { colspan: "{span}", class: "empty-state", "No scrapers match" }
                        }
                    }
                    for row in rows.iter() {
                        ScraperRowView {
                            key: "{row.name}",
                            summary: list.iter().find(|s| s.name == row.name).cloned().unwrap_or_default(),
                            view,
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn SortHeader(label: &'static str, class: &'static str, onsort: EventHandler<MouseEvent>) -> Element {
    rsx! {
        th { class, onclick: move |e| onsort.call(e), "{label}" }
    }
}

#[component]
fn ScraperRowView(
    summary: ScraperSummary,
    view: Signal<TableViewState<String, HistoryColumn>>,
) -> Element {
    let mut view = view;
    let now = Utc::now();
    let name = summary.name.clone();
    let current = summary.current();
    let metrics = current
        .map(|entry| ScrapeMetrics::compute(entry, now))
        .unwrap_or_default();
    let expanded = view.read().is_expanded(&name);
    let columns = HistoryColumn::all();
    let span = columns.len() + 2;
    let toggle_name = name.clone();

    rsx! {
        tr { class: if expanded { "scraper-row expanded" } else { "scraper-row" },
            td {
                button {
                    class: "btn-icon",
                    onclick: move |_| {
                        view.write().toggle_expanded(&toggle_name);
                    },
                    if expanded { "▾" } else { "▸" }
                }
            }
            td { class: "scraper-name", "{name}" }
            for col in columns.iter().copied() {
                td { key: "{col.key()}", {format_cell(current, &metrics, col)} }
            }
        }
        if expanded {
            tr { class: "history-row",
                td { colspan: "{span}",
                    HistoryTable { summary: summary.clone(), view }
                }
            }
        }
    }
}

#[component]
fn HistoryTable(
    summary: ScraperSummary,
    view: Signal<TableViewState<String, HistoryColumn>>,
) -> Element {
    let mut view = view;
    let name = summary.name.clone();
    let (search, sort) = {
        let state = view.read();
        (state.search(&name).to_string(), state.sort_state(&name))
    };
    let rows = history_rows(&summary.history, &search, &sort, Utc::now(), DEFAULT_ROW_CAP);
    let search_name = name.clone();
    let span = HistoryColumn::all().len();

    rsx! {
        div { class: "history-detail",
            input {
                r#type: "search",
                placeholder: "Filter runs by status",
                value: "{search}",
                oninput: move |e: FormEvent| view.write().set_search(&search_name, e.value()),
            }
            table { class: "data-table nested",
                thead {
                    tr {
                        for col in HistoryColumn::all().iter().copied() {
                            SortHeader {
                                key: "{col.key()}",
                                label: col.label(),
                                class: sort_class(&sort, col),
                                onsort: {
                                    let name = name.clone();
                                    move |_| view.write().handle_sort(&name, col)
                                },
                            }
                        }
                    }
                }
                tbody {
                    if rows.is_empty() {
                        tr {
                            td { colspan: "{span}", class: "empty-state", "No runs match" }
                        }
                    }
                    for (i, row) in rows.iter().enumerate() {
                        tr { key: "{row.entry.id}-{i}",
                            for col in HistoryColumn::all().iter().copied() {
                                td { {format_cell(Some(row.entry), &row.metrics, col)} }
                            }
                        }
                    }
                }
            }
        }
    }
}
