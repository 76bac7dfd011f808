//! UI components

pub mod filter_bar;
pub mod notification_bell;
pub mod product_list;
pub mod saved_filters;
pub mod scraper_status;
pub mod stats_panel;
pub mod toast;

pub use filter_bar::FilterBar;
pub use notification_bell::NotificationBell;
pub use product_list::ProductList;
pub use saved_filters::SavedFiltersPanel;
pub use scraper_status::ScraperStatusPanel;
pub use stats_panel::StatsPanel;
pub use toast::{ToastFrame, ToastManager, ToastSeverity, use_toast, use_toast_provider};
