//! Error types for context operations

use thiserror::Error;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("unknown config key '{key}'")]
    UnknownKey { key: String },

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}
