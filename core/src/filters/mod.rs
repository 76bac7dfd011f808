//! Product filter state
//!
//! The [`FilterStore`] is the single owner of the live [`FilterSelection`].
//! Consumers never assign fields directly; every change goes through
//! [`FilterStore::dispatch`] with a named [`FilterAction`], which keeps a
//! bounded journal of transitions and notifies subscribers.

pub mod codec;
mod query;
mod store;

pub use codec::FilterPatch;
pub use query::ProductQuery;
pub use store::{FilterAction, FilterStore, FilterTransition, SubscriptionId, price_label, reduce};
