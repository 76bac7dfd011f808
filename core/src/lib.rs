pub mod api;
pub mod favourites;
pub mod filters;
pub mod loadable;
pub mod saved_filters;
pub mod scrape;
pub mod session;
pub mod table;

#[cfg(not(target_arch = "wasm32"))]
pub mod context;

// Re-exports for convenience
pub use api::{AdminStats, ApiClient, ApiError, LoginOutcome, RequestFence, Ticket};
pub use favourites::{FavouriteAction, FavouritesStore};
pub use filters::codec::{self, FilterPatch};
pub use filters::{FilterAction, FilterStore, FilterTransition, ProductQuery, SubscriptionId};
pub use loadable::Loadable;
pub use saved_filters::SavedFilters;
pub use scrape::{HistoryColumn, HistoryRow, ScrapeMetrics, ScraperColumn, ScraperRow};
pub use session::{AdminGate, Session};
pub use table::{
    ResetPolicy, SortDirection, SortOrigin, SortState, SortValue, TableState, TableViewState,
    filter_rows, sort_rows,
};

#[cfg(not(target_arch = "wasm32"))]
pub use context::{ClientConfig, ConfigError, Poller};

pub use buysearch_types as types;
