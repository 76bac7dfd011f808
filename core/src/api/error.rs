//! Error types for API calls

use thiserror::Error;

/// Errors returned by [`super::ApiClient`]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base url '{url}'")]
    InvalidBaseUrl { url: String },

    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("not authorized (status {status})")]
    Unauthorized { status: u16 },

    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("unexpected response body from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Whether the session token is missing, expired or insufficient.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}
