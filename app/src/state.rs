//! Application state shared through context
//!
//! Each store lives in a signal; components mutate them only through the
//! store's named actions.

use std::rc::Rc;

use dioxus::prelude::*;

use buysearch_core::{
    AdminGate, ApiClient, FavouriteAction, FavouritesStore, FilterAction, FilterStore,
    RequestFence, SavedFilters, Session, codec,
};

use crate::utils;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum View {
    Search,
    Status,
    Stats,
}

#[derive(Clone)]
pub struct AppContext {
    pub api: ApiClient,
    pub filters: Signal<FilterStore>,
    pub favourites: Signal<FavouritesStore>,
    pub saved: Signal<SavedFilters>,
    pub session: Signal<Session>,
    pub admin: Signal<AdminGate>,
    pub view: Signal<View>,
    pub product_fence: Rc<RequestFence>,
    pub parse_fence: Rc<RequestFence>,
}

impl AppContext {
    /// Seeds filters from the location fragment and the session from the
    /// token cookie.
    pub fn new(api: ApiClient) -> Self {
        let session = Session::new(utils::read_cookie(buysearch_core::api::TOKEN_COOKIE));
        Self {
            api,
            filters: Signal::new(FilterStore::from_fragment(&utils::current_fragment())),
            favourites: Signal::new(FavouritesStore::new()),
            saved: Signal::new(SavedFilters::default()),
            session: Signal::new(session),
            admin: Signal::new(AdminGate::Pending),
            view: Signal::new(View::Search),
            product_fence: Rc::new(RequestFence::new()),
            parse_fence: Rc::new(RequestFence::new()),
        }
    }

    /// Apply a filter action and mirror the selection into the fragment.
    pub fn dispatch(&self, action: FilterAction) {
        let mut filters = self.filters;
        let changed = filters.write().dispatch(action);
        if changed {
            utils::replace_fragment(&codec::to_fragment(filters.peek().selection()));
        }
    }

    /// Toggle a favourite on the server, then locally.
    pub fn toggle_favourite(&self, product_id: i64) {
        let api = self.api.clone();
        let mut favourites = self.favourites;
        spawn(async move {
            let action = favourites.peek().resolve(FavouriteAction::Toggle(product_id));
            let result = match action {
                FavouriteAction::Add(id) => api.add_favourite(id).await,
                FavouriteAction::Remove(id) => api.remove_favourite(id).await,
                _ => Ok(()),
            };
            match result {
                Ok(()) => {
                    favourites.write().dispatch(action);
                }
                Err(e) => {
                    tracing::warn!(product_id, error = %e, "favourite toggle failed");
                    notify_error(format!("Could not update favourites: {e}"));
                }
            }
        });
    }
}

fn notify_error(message: String) {
    if let Some(mut toasts) = try_consume_context::<crate::components::ToastManager>() {
        toasts.show(message, crate::components::ToastSeverity::Error);
    }
}

/// Contexts are compared by identity; the signals inside carry the state.
impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.product_fence, &other.product_fence)
    }
}

pub fn use_app() -> AppContext {
    use_context::<AppContext>()
}
