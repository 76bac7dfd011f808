use std::sync::Arc;

use buysearch_core::context::{ClientConfig, Poller};
use buysearch_core::types::{FilterSelection, Page, Product};
use buysearch_core::{
    ApiClient, FavouritesStore, FilterAction, FilterStore, HistoryColumn, RequestFence,
    SavedFilters, ScraperColumn, Session, TableState, TableViewState, codec,
};
use tokio::sync::{Mutex, RwLock};

/// Long-running tasks owned by the shell.
#[derive(Default)]
pub struct BackgroundTasks {
    pub unseen_notifications: Option<Poller<u64>>,
}

impl BackgroundTasks {
    pub fn stop_all(&mut self) {
        if let Some(poller) = self.unseen_notifications.take() {
            poller.stop();
        }
    }
}

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the core state types.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<ClientConfig>>,
    api: Arc<RwLock<ApiClient>>,
    pub session: Arc<RwLock<Session>>,
    pub filters: Arc<Mutex<FilterStore>>,
    pub favourites: Arc<RwLock<FavouritesStore>>,
    pub saved: Arc<RwLock<SavedFilters>>,
    /// Most recent product page, for `page`
    pub last_page: Arc<RwLock<Option<Page<Product>>>>,
    pub scraper_table: Arc<Mutex<TableState<ScraperColumn>>>,
    pub history_view: Arc<Mutex<TableViewState<String, HistoryColumn>>>,
    pub product_fence: Arc<RequestFence>,
    pub parse_fence: Arc<RequestFence>,
    pub tasks: Arc<Mutex<BackgroundTasks>>,
}

impl CliContext {
    pub fn new() -> Result<Self, String> {
        Self::with_config(ClientConfig::load())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, String> {
        let session = Session::new(config.session_token.clone());
        let api = build_api(&config, &session)?;
        let filters = config
            .last_fragment
            .as_deref()
            .map(FilterStore::from_fragment)
            .unwrap_or_default();

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            api: Arc::new(RwLock::new(api)),
            session: Arc::new(RwLock::new(session)),
            filters: Arc::new(Mutex::new(filters)),
            favourites: Arc::new(RwLock::new(FavouritesStore::new())),
            saved: Arc::new(RwLock::new(SavedFilters::default())),
            last_page: Arc::new(RwLock::new(None)),
            scraper_table: Arc::new(Mutex::new(ScraperColumn::table_state())),
            history_view: Arc::new(Mutex::new(HistoryColumn::view_state())),
            product_fence: Arc::new(RequestFence::new()),
            parse_fence: Arc::new(RequestFence::new()),
            tasks: Arc::new(Mutex::new(BackgroundTasks::default())),
        })
    }

    /// Snapshot of the client; clones share one connection pool.
    pub async fn api(&self) -> ApiClient {
        self.api.read().await.clone()
    }

    /// Rebuild the client after the base url or timeout changed.
    pub async fn rebuild_api(&self) -> Result<(), String> {
        let api = {
            let config = self.config.read().await;
            let session = self.session.read().await;
            build_api(&config, &session)?
        };
        *self.api.write().await = api;
        Ok(())
    }

    pub async fn selection(&self) -> FilterSelection {
        self.filters.lock().await.selection().clone()
    }

    /// Apply a filter action and persist the resulting fragment.
    pub async fn dispatch(&self, action: FilterAction) -> bool {
        let changed = self.filters.lock().await.dispatch(action);
        if changed {
            self.persist_fragment().await;
        }
        changed
    }

    /// Store the current selection's fragment for the next start-up.
    pub async fn persist_fragment(&self) {
        let fragment = codec::to_fragment(self.filters.lock().await.selection());
        let mut config = self.config.write().await;
        config.last_fragment = Some(fragment);
        if let Err(e) = config.save() {
            tracing::warn!(error = %e, "failed to persist filter fragment");
        }
    }

    /// Replace the session token everywhere it is held.
    pub async fn set_token(&self, token: Option<String>) {
        let token = {
            let mut session = self.session.write().await;
            session.set_token(token);
            session.token().map(String::from)
        };
        self.api.write().await.set_token(token.clone());

        let mut config = self.config.write().await;
        config.session_token = token;
        if let Err(e) = config.save() {
            tracing::warn!(error = %e, "failed to persist session token");
        }
        drop(config);

        self.restart_pollers().await;
    }

    /// (Re)start background polling; nothing runs while logged out.
    pub async fn restart_pollers(&self) {
        let mut tasks = self.tasks.lock().await;
        tasks.stop_all();

        if !self.session.read().await.is_logged_in() {
            return;
        }
        let interval = self.config.read().await.poll_interval();
        let api = self.api().await;
        tasks.unseen_notifications = Some(Poller::spawn("unseen-notifications", interval, move || {
            let api = api.clone();
            async move { api.unseen_count().await }
        }));
    }

    pub async fn shutdown(&self) {
        self.product_fence.invalidate();
        self.parse_fence.invalidate();
        self.tasks.lock().await.stop_all();
    }
}

fn build_api(config: &ClientConfig, session: &Session) -> Result<ApiClient, String> {
    let mut api = ApiClient::with_timeout(&config.api_base_url, config.request_timeout())
        .map_err(|e| e.to_string())?;
    api.set_token(session.token().map(String::from));
    Ok(api)
}
