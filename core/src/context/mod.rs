mod config;
mod error;
mod poller;

pub use config::ClientConfig;
pub use error::ConfigError;
pub use poller::Poller;
