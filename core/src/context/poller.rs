//! Interval polling of API resources

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{ApiError, RequestFence};
use crate::loadable::Loadable;

/// Background task that refetches a resource on an interval and publishes
/// the latest result on a watch channel.
pub struct Poller<T> {
    name: &'static str,
    rx: watch::Receiver<Loadable<T>>,
    refresh: Arc<Notify>,
    fence: Arc<RequestFence>,
    handle: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Send + Sync + 'static,
{
    pub fn spawn<F, Fut>(name: &'static str, interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(Loadable::Loading);
        let refresh = Arc::new(Notify::new());
        let fence = Arc::new(RequestFence::new());

        let task_refresh = Arc::clone(&refresh);
        let task_fence = Arc::clone(&fence);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = task_refresh.notified() => {}
                }

                let ticket = task_fence.issue();
                let result = fetch().await;
                let Some(result) = task_fence.accept(ticket, result) else {
                    continue;
                };
                if let Err(e) = &result {
                    tracing::warn!(poller = name, error = %e, "poll failed");
                }
                if tx.send(Loadable::from_result(result)).is_err() {
                    tracing::debug!(poller = name, "no receivers left, stopping");
                    break;
                }
            }
        });

        tracing::debug!(poller = name, ?interval, "poller started");
        Self {
            name,
            rx,
            refresh,
            fence,
            handle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fetch immediately instead of waiting for the next tick.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    pub fn subscribe(&self) -> watch::Receiver<Loadable<T>> {
        self.rx.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop polling; an in-flight response is discarded.
    pub fn stop(&self) {
        self.fence.invalidate();
        self.handle.abort();
    }
}

impl<T: Clone> Poller<T> {
    pub fn latest(&self) -> Loadable<T> {
        self.rx.borrow().clone()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.fence.invalidate();
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn test_poller_publishes_results() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let poller = Poller::spawn("count", Duration::from_secs(3600), move || {
            let counter = Arc::clone(&counter);
            async move { Ok::<_, ApiError>(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        let mut rx = poller.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Loadable::Ready(1));

        poller.refresh_now();
        rx.changed().await.unwrap();
        assert_eq!(poller.latest(), Loadable::Ready(2));
    }

    #[tokio::test]
    async fn test_stopped_poller_finishes() {
        let poller = Poller::spawn("idle", Duration::from_millis(5), || async {
            Ok::<_, ApiError>(())
        });
        poller.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!poller.is_running());
    }
}
