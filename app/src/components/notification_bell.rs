//! Unseen-notification badge and dropdown.
//!
//! The count is refreshed on a fixed interval and whenever the window
//! regains focus.

use dioxus::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use buysearch_core::Loadable;
use buysearch_core::loadable::count_badge;
use buysearch_core::scrape::format::format_time;
use buysearch_core::types::{Notification, Page};

use crate::components::use_toast;
use crate::state::use_app;

const POLL_INTERVAL_MS: u32 = 30_000;
const LIST_LIMIT: u64 = 20;

#[component]
pub fn NotificationBell() -> Element {
    let app = use_app();
    let mut toasts = use_toast();
    let mut tick = use_signal(|| 0u64);
    let mut open = use_signal(|| false);
    let mut listing = use_signal(|| Loadable::<Page<Notification>>::Loading);

    use_future(move || async move {
        loop {
            gloo_timers::future::TimeoutFuture::new(POLL_INTERVAL_MS).await;
            tick += 1;
        }
    });

    use_effect(move || {
        let closure = Closure::wrap(Box::new(move || {
            tick += 1;
        }) as Box<dyn FnMut()>);
        if let Some(window) = web_sys::window() {
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
        }
        closure.forget();
    });

    let count_app = app.clone();
    let unseen = use_resource(move || {
        let app = count_app.clone();
        let _ = tick();
        let logged_in = app.session.read().is_logged_in();
        async move {
            if !logged_in {
                return Loadable::Ready(0);
            }
            let result = app.api.unseen_count().await;
            if let Err(e) = &result {
                tracing::debug!(error = %e, "unseen count unavailable");
            }
            Loadable::from_result(result)
        }
    });

    if !app.session.read().is_logged_in() {
        return rsx! {};
    }

    let toggle_api = app.api.clone();
    let on_toggle = move |_| {
        let now_open = !*open.peek();
        open.set(now_open);
        if !now_open {
            return;
        }
        listing.set(Loadable::Loading);
        let api = toggle_api.clone();
        spawn(async move {
            listing.set(Loadable::from_result(api.notifications(0, LIST_LIMIT).await));
        });
    };

    let seen_api = app.api.clone();
    let on_mark_seen = move |_| {
        let ids: Vec<i64> = listing
            .peek()
            .ready()
            .map(|page| page.items.iter().filter(|n| !n.is_seen).map(|n| n.id).collect())
            .unwrap_or_default();
        if ids.is_empty() {
            return;
        }
        let api = seen_api.clone();
        spawn(async move {
            match api.mark_seen(&ids).await {
                Ok(()) => {
                    if let Loadable::Ready(page) = &mut *listing.write() {
                        for n in page.items.iter_mut() {
                            n.is_seen = true;
                        }
                    }
                    tick += 1;
                }
                Err(e) => toasts.error(format!("Could not mark notifications: {e}")),
            }
        });
    };

    let (badge, badge_class) = match &*unseen.read() {
        Some(state) => (
            count_badge(state),
            if state.error().is_some() { "badge badge-error" } else { "badge" },
        ),
        None => (None, "badge"),
    };
    let state = listing.read().clone();

    rsx! {
        div { class: "notification-bell",
            button { class: "btn-icon bell", title: "Notifications", onclick: on_toggle,
                "🔔"
                {badge.map(|text| rsx! { span { class: badge_class, "{text}" } })}
            }
            if open() {
                div { class: "notification-dropdown",
                    div { class: "dropdown-header",
                        span { "Notifications" }
                        button { class: "btn-link", onclick: on_mark_seen, "Mark all seen" }
                    }
                    {
                        match state {
                            Loadable::Loading => rsx! { p { class: "hint", "Loading..." } },
                            Loadable::Failed(msg) => rsx! { p { class: "hint error", "{msg}" } },
                            Loadable::Ready(page) if page.items.is_empty() => rsx! {
                                p { class: "hint", "No notifications" }
                            },
                            Loadable::Ready(page) => rsx! {
                                ul {
                                    for n in page.items {
                                        li { key: "{n.id}", class: if n.is_seen { "seen" } else { "unseen" },
                                            strong { "{n.title}" }
                                            p { "{n.message}" }
                                            span { class: "hint", {format_time(n.created_at)} }
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
}
