#![allow(non_snake_case)]

use chrono::Utc;
use dioxus::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use buysearch_core::api::TOKEN_COOKIE;
use buysearch_core::types::LoginRequest;
use buysearch_core::{AdminGate, ApiClient, FavouriteAction, FilterAction, Session, codec};

use crate::components::{
    FilterBar, NotificationBell, ProductList, SavedFiltersPanel, ScraperStatusPanel, StatsPanel,
    ToastFrame, ToastManager, use_toast, use_toast_provider,
};
use crate::state::{AppContext, View, use_app};
use crate::utils;

static CSS: Asset = asset!("/assets/styles.css");

/// Session marker when the token lives in an HttpOnly cookie.
const COOKIE_SESSION: &str = "cookie";

#[component]
pub fn App() -> Element {
    let context = use_hook(|| {
        ApiClient::new(utils::api_base())
            .map(AppContext::new)
            .map_err(|e| e.to_string())
    });

    match context {
        Ok(app) => rsx! { Shell { app } },
        Err(msg) => {
            tracing::error!(error = %msg, "search service address unusable");
            rsx! {
                link { rel: "stylesheet", href: CSS }
                div { class: "error-state",
                    p { "The search service address is not usable." }
                    p { class: "hint", "{msg}" }
                }
            }
        }
    }
}

#[component]
fn Shell(app: AppContext) -> Element {
    use_toast_provider();
    let toasts = use_toast();
    let app = use_context_provider(|| app);

    // Back/forward navigation and pasted links re-seed the filters
    let hash_app = app.clone();
    use_effect(move || {
        let app = hash_app.clone();
        let closure = Closure::wrap(Box::new(move || {
            let patch = codec::decode(&utils::current_fragment());
            app.dispatch(FilterAction::Reseed(patch));
        }) as Box<dyn FnMut()>);
        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
        }
        closure.forget();
    });

    // Re-resolve the admin gate and favourites whenever the session changes
    let session_app = app.clone();
    use_effect(move || {
        let app = session_app.clone();
        let session = app.session.read().clone();
        spawn(async move {
            resolve_admin(&app, &session).await;
            load_favourites(&app, &session, toasts).await;
        });
    });

    let mut view = app.view;
    let current = view();
    let admin = app.admin.read().is_allowed();

    rsx! {
        link { rel: "stylesheet", href: CSS }
        div { class: "app-shell",
            header { class: "app-header",
                h1 { "BuySearch" }
                nav {
                    button {
                        class: if current == View::Search { "tab active" } else { "tab" },
                        onclick: move |_| view.set(View::Search),
                        "Search"
                    }
                    if admin {
                        button {
                            class: if current == View::Status { "tab active" } else { "tab" },
                            onclick: move |_| view.set(View::Status),
                            "Scrapers"
                        }
                        button {
                            class: if current == View::Stats { "tab active" } else { "tab" },
                            onclick: move |_| view.set(View::Stats),
                            "Statistics"
                        }
                    }
                }
                div { class: "header-actions",
                    NotificationBell {}
                    AccountMenu {}
                }
            }
            main { class: "app-main",
                {
                    match current {
                        View::Search => rsx! {
                            div { class: "search-layout",
                                aside { class: "sidebar", SavedFiltersPanel {} }
                                div { class: "results",
                                    FilterBar {}
                                    ProductList {}
                                }
                            }
                        },
                        View::Status => rsx! { ScraperStatusPanel {} },
                        View::Stats => rsx! { StatsPanel {} },
                    }
                }
            }
            ToastFrame {}
        }
    }
}

/// Decide admin access from token claims, falling back to the profile
/// endpoint when the token cookie is not readable from script.
async fn resolve_admin(app: &AppContext, session: &Session) {
    let mut admin = app.admin;
    let gate = match session.claims() {
        Some(_) => session.admin_gate(Utc::now()),
        None => match app.api.me().await {
            Ok(user) => {
                if !session.is_logged_in() {
                    let mut current = app.session;
                    current.write().set_token(Some(COOKIE_SESSION.to_string()));
                }
                if user.is_admin() {
                    AdminGate::Allowed
                } else {
                    AdminGate::Denied
                }
            }
            Err(e) => {
                if !e.is_auth() {
                    tracing::warn!(error = %e, "profile lookup failed");
                }
                AdminGate::Denied
            }
        },
    };
    tracing::debug!(?gate, "admin gate resolved");
    admin.set(gate);
}

async fn load_favourites(
    app: &AppContext,
    session: &Session,
    mut toasts: ToastManager,
) {
    let mut favourites = app.favourites;
    if !session.is_logged_in() {
        favourites.write().dispatch(FavouriteAction::Replace(Vec::new()));
        return;
    }
    match app.api.favourites().await {
        Ok(products) => {
            let ids = products.iter().map(|p| p.id).collect();
            favourites.write().dispatch(FavouriteAction::Replace(ids));
        }
        Err(e) if e.is_auth() => {}
        Err(e) => toasts.error(format!("Favourites unavailable: {e}")),
    }
}

#[component]
fn AccountMenu() -> Element {
    let app = use_app();
    let mut toasts = use_toast();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut session = app.session;

    if session.read().is_logged_in() {
        let api = app.api.clone();
        let mut view = app.view;
        return rsx! {
            button {
                class: "btn btn-secondary",
                onclick: move |_| {
                    let api = api.clone();
                    spawn(async move {
                        if let Err(e) = api.logout().await {
                            tracing::warn!(error = %e, "logout request failed");
                        }
                        session.write().clear();
                        view.set(View::Search);
                    });
                },
                "Log out"
            }
        };
    }

    let api = app.api.clone();
    let mut on_login = move |_| {
        let request = LoginRequest {
            email: email.peek().trim().to_string(),
            password: password.peek().clone(),
        };
        if request.email.is_empty() || request.password.is_empty() {
            toasts.error("Enter email and password");
            return;
        }
        let api = api.clone();
        spawn(async move {
            match api.login(&request).await {
                Ok(outcome) => {
                    // Browsers hide Set-Cookie; the cookie itself may still be readable
                    let token = outcome
                        .token
                        .or_else(|| utils::read_cookie(TOKEN_COOKIE))
                        .unwrap_or_else(|| COOKIE_SESSION.to_string());
                    session.write().set_token(Some(token));
                    password.set(String::new());
                    toasts.info(format!("Signed in as {}", outcome.user.email));
                }
                Err(e) if e.is_auth() => toasts.error("Wrong email or password"),
                Err(e) => toasts.error(format!("Login failed: {e}")),
            }
        });
    };

    rsx! {
        form {
            class: "login-form",
            onsubmit: move |e: FormEvent| {
                e.prevent_default();
                on_login(());
            },
            input {
                r#type: "email",
                placeholder: "Email",
                value: "{email}",
                oninput: move |e: FormEvent| email.set(e.value()),
            }
            input {
                r#type: "password",
                placeholder: "Password",
                value: "{password}",
                oninput: move |e: FormEvent| password.set(e.value()),
            }
            button { r#type: "submit", class: "btn", "Log in" }
        }
    }
}
