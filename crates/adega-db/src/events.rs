//! # Change Feed
//!
//! Notifications published after every committed write.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repository write ──► COMMIT ──► ChangeFeed::publish(ChangeEvent)       │
//! │                                          │                              │
//! │                     broadcast::channel ◄─┘                              │
//! │                      │            │                                     │
//! │                      ▼            ▼                                     │
//! │             summary watcher   dashboard watcher  (full reload each)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events are invalidation hints only. Subscribers re-read the database,
//! they never apply the event as a delta. A subscriber that falls behind
//! gets `RecvError::Lagged` and should simply reload.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// Buffered events per subscriber before it starts lagging.
const FEED_CAPACITY: usize = 256;

/// The tables a subscriber can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Products,
    Categories,
    Profiles,
    CashSessions,
    Movements,
    Sales,
    SaleItems,
}

/// What happened to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One committed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
    pub id: String,
}

impl ChangeEvent {
    pub fn new(collection: Collection, kind: ChangeKind, id: impl Into<String>) -> Self {
        ChangeEvent {
            collection,
            kind,
            id: id.into(),
        }
    }
}

/// Broadcast hub shared by every repository of one [`crate::Database`].
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        ChangeFeed { tx }
    }

    /// Publishes committed changes. Call only after the transaction commits.
    pub fn publish<I>(&self, events: I)
    where
        I: IntoIterator<Item = ChangeEvent>,
    {
        for event in events {
            trace!(collection = ?event.collection, kind = ?event.kind, id = %event.id, "change");
            // No subscribers is not an error.
            let _ = self.tx.send(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        feed.publish([
            ChangeEvent::new(Collection::Sales, ChangeKind::Insert, "s1"),
            ChangeEvent::new(Collection::SaleItems, ChangeKind::Insert, "i1"),
        ]);

        assert_eq!(rx.recv().await.unwrap().collection, Collection::Sales);
        assert_eq!(rx.recv().await.unwrap().id, "i1");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let feed = ChangeFeed::new();
        feed.publish([ChangeEvent::new(
            Collection::Products,
            ChangeKind::Delete,
            "p1",
        )]);
        assert_eq!(feed.subscriber_count(), 0);
    }
}
