//! # Reload Watchers
//!
//! Keeps a screen's data fresh: whenever a relevant collection changes,
//! reload everything and publish the new value.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  repository COMMIT                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ChangeFeed (broadcast) ──► watcher task                                │
//! │                              │  collection in filter?                   │
//! │                              │  (Lagged counts as yes)                  │
//! │                              ▼                                          │
//! │                         loader().await                                  │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                     watch::Sender<PosResult<T>> ──► screen              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events only say *something* changed. The loader always re-reads in full.

use std::future::Future;

use adega_db::{ChangeEvent, Collection};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::PosResult;

/// Collections the register summary depends on.
pub const SESSION_COLLECTIONS: &[Collection] = &[
    Collection::Sales,
    Collection::Movements,
    Collection::CashSessions,
];

/// Collections the dashboard depends on.
pub const DASHBOARD_COLLECTIONS: &[Collection] = &[
    Collection::CashSessions,
    Collection::Sales,
    Collection::SaleItems,
    Collection::Products,
];

/// A live value kept up to date by a background task.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct WatchHandle<T> {
    rx: watch::Receiver<PosResult<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone> WatchHandle<T> {
    /// Latest loaded value (or the error the last load returned).
    pub fn current(&self) -> PosResult<T> {
        self.rx.borrow().clone()
    }

    /// Waits for the next reload. `false` once the watcher has stopped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Another receiver on the same value.
    pub fn receiver(&self) -> watch::Receiver<PosResult<T>> {
        self.rx.clone()
    }
}

impl<T> Drop for WatchHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Loads once, then reloads whenever one of `collections` changes.
///
/// `events` must be subscribed before the first load so no change between
/// the load and the subscription is missed.
pub async fn watch_reload<T, F, Fut>(
    mut events: broadcast::Receiver<ChangeEvent>,
    collections: &'static [Collection],
    loader: F,
) -> WatchHandle<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PosResult<T>> + Send + 'static,
{
    let (tx, rx) = watch::channel(loader().await);

    let task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if !collections.contains(&event.collection) => continue,
                Ok(event) => {
                    debug!(collection = ?event.collection, id = %event.id, "Change received");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Change feed lagged, reloading");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }

            // Coalesce whatever else is already queued into this reload.
            loop {
                match events.try_recv() {
                    Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }

            if tx.send(loader().await).is_err() {
                // every receiver is gone
                break;
            }
        }
    });

    WatchHandle { rx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adega_db::{ChangeFeed, ChangeKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reloads_only_on_watched_collections() {
        let feed = ChangeFeed::new();
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();

        let mut handle = watch_reload(feed.subscribe(), SESSION_COLLECTIONS, move || {
            let counter = counter.clone();
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        })
        .await;
        assert_eq!(handle.current().unwrap(), 1);

        feed.publish([ChangeEvent::new(Collection::Categories, ChangeKind::Insert, "c")]);
        feed.publish([ChangeEvent::new(Collection::Movements, ChangeKind::Insert, "m")]);

        tokio::time::timeout(Duration::from_secs(2), handle.changed())
            .await
            .unwrap();
        assert_eq!(handle.current().unwrap(), 2);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }
}
