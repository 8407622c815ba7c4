//! Per-post subscriber registry for the change feed

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use forum_core::{LikeChange, LikeSubscription, PostId};

/// Queue depth per subscriber. Notifications only mean "reload", so a full
/// queue can safely drop new ones.
const SUBSCRIBER_BUFFER: usize = 16;

type Subscriber = (u64, mpsc::Sender<LikeChange>);

#[derive(Default)]
struct RegistryInner {
    subscribers: DashMap<PostId, Vec<Subscriber>>,
    next_id: AtomicU64,
}

/// Fan-out table from post id to open subscriptions
#[derive(Clone, Default)]
pub struct FeedRegistry {
    inner: Arc<RegistryInner>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a subscription whose cancel hook removes it from the registry
    pub fn register(&self, post_id: &PostId) -> LikeSubscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        self.inner
            .subscribers
            .entry(post_id.clone())
            .or_default()
            .push((id, tx));

        tracing::debug!(post_id = %post_id, subscriber = id, "Feed subscriber registered");

        let inner = Arc::clone(&self.inner);
        let key = post_id.clone();
        LikeSubscription::new(post_id.clone(), rx, move || {
            inner.remove(&key, id);
        })
    }

    /// Deliver a change to every subscriber of its post
    ///
    /// Returns how many subscribers received it.
    pub fn dispatch(&self, change: &LikeChange) -> usize {
        let Some(mut senders) = self.inner.subscribers.get_mut(&change.post_id) else {
            return 0;
        };

        let mut delivered = 0;
        senders.retain(|(_, tx)| match tx.try_send(change.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Closed(_)) => false,
        });
        delivered
    }

    /// Tell every subscriber to reload, after the upstream connection was lost
    pub fn resync_all(&self) {
        for mut entry in self.inner.subscribers.iter_mut() {
            let change = LikeChange::resync(entry.key().clone());
            entry
                .value_mut()
                .retain(|(_, tx)| !matches!(tx.try_send(change.clone()), Err(TrySendError::Closed(_))));
        }
    }

    /// Number of open subscriptions for a post
    pub fn subscriber_count(&self, post_id: &PostId) -> usize {
        self.inner
            .subscribers
            .get(post_id)
            .map_or(0, |senders| senders.len())
    }

    /// Number of posts with at least one subscription
    pub fn post_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl RegistryInner {
    fn remove(&self, post_id: &PostId, id: u64) {
        if let Entry::Occupied(mut entry) = self.subscribers.entry(post_id.clone()) {
            entry.get_mut().retain(|(sub_id, _)| *sub_id != id);
            if entry.get().is_empty() {
                entry.remove();
            }
        }
        tracing::debug!(post_id = %post_id, subscriber = id, "Feed subscriber removed");
    }
}
