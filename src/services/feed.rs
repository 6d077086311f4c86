//! Snapshot feed: the in-process half of the real-time subscription model.
//!
//! Each store adapter owns a [`SnapshotFeed`] holding the latest full
//! snapshot of its data. Every mutation (local or signalled over Redis)
//! replaces the snapshot; subscribers observe replacements in commit order.
//! Intermediate snapshots may be coalesced under load, but the newest one is
//! always delivered — subscribers receive whole lists, never diffs.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use thiserror::Error;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Refresh failure surfaced to subscribers in-stream. The feed stays alive;
/// the next successful refresh delivers a normal snapshot again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feed refresh failed: {0}")]
pub struct FeedError(pub String);

impl From<FeedError> for crate::error::StoreError {
    fn from(e: FeedError) -> Self {
        crate::error::StoreError::Unavailable(anyhow::anyhow!(e))
    }
}

type Payload<T> = Result<Arc<T>, FeedError>;

pub struct SnapshotFeed<T> {
    tx: watch::Sender<Payload<T>>,
}

impl<T: Send + Sync + 'static> SnapshotFeed<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(Ok(Arc::new(initial)));
        Self { tx }
    }

    /// Replace the current snapshot. Applied even when nobody is listening,
    /// so late subscribers start from the newest state.
    pub fn publish(&self, snapshot: T) {
        self.tx.send_replace(Ok(Arc::new(snapshot)));
    }

    pub fn publish_error(&self, error: FeedError) {
        self.tx.send_replace(Err(error));
    }

    pub fn latest(&self) -> Payload<T> {
        self.tx.borrow().clone()
    }

    /// Open a live subscription. The current snapshot is delivered first,
    /// then every subsequent replacement.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            inner: WatchStream::new(self.tx.subscribe()),
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Handle to one live subscription.
///
/// `unsubscribe` takes the handle by value: a second call does not compile,
/// which is the single-call discipline the underlying channel requires.
/// Dropping the handle without calling it releases the channel just the same.
pub struct Subscription<T> {
    inner: WatchStream<Payload<T>>,
}

impl<T> Subscription<T> {
    pub fn unsubscribe(self) {}
}

impl<T: Send + Sync + 'static> Stream for Subscription<T> {
    type Item = Payload<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn delivers_current_snapshot_first() {
        let feed = SnapshotFeed::new(vec!["a"]);
        let mut sub = feed.subscribe();
        let first = sub.next().await.unwrap().unwrap();
        assert_eq!(*first, vec!["a"]);
    }

    #[tokio::test]
    async fn late_subscriber_sees_newest_snapshot() {
        let feed = SnapshotFeed::new(vec!["a"]);
        feed.publish(vec!["b", "a"]);
        feed.publish(vec!["c", "b", "a"]);

        let mut sub = feed.subscribe();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(*snapshot, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn replacements_arrive_in_commit_order() {
        let feed = SnapshotFeed::new(vec!["a"]);
        let mut sub = feed.subscribe();
        assert_eq!(*sub.next().await.unwrap().unwrap(), vec!["a"]);

        feed.publish(vec!["b", "a"]);
        assert_eq!(*sub.next().await.unwrap().unwrap(), vec!["b", "a"]);

        feed.publish(vec!["c", "b", "a"]);
        assert_eq!(*sub.next().await.unwrap().unwrap(), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn errors_travel_in_stream_without_closing_it() {
        let feed = SnapshotFeed::new(0u32);
        let mut sub = feed.subscribe();
        sub.next().await.unwrap().unwrap();

        feed.publish_error(FeedError("store unavailable".into()));
        let err = sub.next().await.unwrap().unwrap_err();
        assert_eq!(err, FeedError("store unavailable".into()));

        feed.publish(7);
        assert_eq!(*sub.next().await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn unsubscribe_releases_the_channel() {
        let feed = SnapshotFeed::new(());
        let sub = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 1);
        sub.unsubscribe();
        assert_eq!(feed.subscriber_count(), 0);
    }
}
