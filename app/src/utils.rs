//! Browser helpers: location fragment, cookies, API origin.

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;

use buysearch_core::SortDirection;
use buysearch_core::SortState;

/// API root on the serving origin.
pub fn api_base() -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default();
    format!("{origin}/api")
}

/// Current `location.hash`, empty when unavailable.
pub fn current_fragment() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

/// Replace the fragment without adding a history entry.
pub fn replace_fragment(fragment: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if current_fragment() == fragment {
        return;
    }
    let result = window
        .history()
        .and_then(|h| h.replace_state_with_url(&JsValue::NULL, "", Some(fragment)));
    if let Err(e) = result {
        tracing::warn!(?e, "failed to update location fragment");
    }
}

/// Value of a readable (non HttpOnly) cookie.
pub fn read_cookie(name: &str) -> Option<String> {
    let document = web_sys::window()?
        .document()?
        .dyn_into::<web_sys::HtmlDocument>()
        .ok()?;
    let cookies = document.cookie().ok()?;
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// CSS class for a sortable header cell.
pub fn sort_class<K: Copy + PartialEq>(state: &SortState<K>, key: K) -> &'static str {
    match state.direction_for(key) {
        Some(SortDirection::Asc) => "sortable sorted-asc",
        Some(SortDirection::Desc) => "sortable sorted-desc",
        None => "sortable",
    }
}

pub fn format_price(price: Option<f64>, currency: Option<&str>) -> String {
    match price {
        Some(p) => match currency {
            Some(c) => format!("{p:.2} {c}"),
            None => format!("{p:.2}"),
        },
        None => "-".to_string(),
    }
}
