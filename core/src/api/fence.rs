//! Request-generation fencing
//!
//! Repeated requests for the same resource (polling, search-as-you-type,
//! parser callbacks) can resolve out of order. Each request takes a
//! [`Ticket`] from the resource's [`RequestFence`]; a response is applied
//! only if its ticket is still the newest one issued.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestFence {
    latest: AtomicU64,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Drop every outstanding request (consumer went away).
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// Pass `value` through only if `ticket` is still current.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(?ticket, "discarding stale response");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let fence = RequestFence::new();
        let first = fence.issue();
        let second = fence.issue();

        // Second response arrives first, then the stale one
        assert_eq!(fence.accept(second, "new"), Some("new"));
        assert_eq!(fence.accept(first, "old"), None);
    }

    #[test]
    fn test_invalidate_drops_outstanding() {
        let fence = RequestFence::new();
        let ticket = fence.issue();
        fence.invalidate();
        assert!(!fence.is_current(ticket));
        assert!(fence.is_current(fence.issue()));
    }
}
