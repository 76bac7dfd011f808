//! REST API access
//!
//! - [`ApiClient`]: typed calls for every backend endpoint
//! - [`RequestFence`]: discards responses superseded by a newer request
//! - [`AdminStats`]: the independent admin statistics panels

mod client;
mod error;
mod fence;
mod stats;

pub use client::{ApiClient, LoginOutcome, TOKEN_COOKIE};
pub use error::ApiError;
pub use fence::{RequestFence, Ticket};
pub use stats::{AdminStats, top_buckets};
