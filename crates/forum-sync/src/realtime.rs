//! Realtime subscription manager
//!
//! Keeps exactly one change subscription open for the post a synchronizer
//! currently shows, and reloads on every notification.

use std::sync::Arc;

use tokio::task::JoinHandle;

use forum_core::{LikeChangeFeed, LikeEvents, PostId, SubscriptionGuard};

use crate::error::SyncResult;
use crate::synchronizer::LikeSync;

struct ActiveWatch {
    guard: SubscriptionGuard,
    task: JoinHandle<()>,
}

/// Owns the change subscription of one consumer
pub struct LikeWatcher {
    feed: Arc<dyn LikeChangeFeed>,
    sync: LikeSync,
    active: Option<ActiveWatch>,
}

impl LikeWatcher {
    /// Subscribe to the synchronizer's current post
    pub fn attach(feed: Arc<dyn LikeChangeFeed>, sync: LikeSync) -> SyncResult<Self> {
        let mut watcher = Self {
            feed,
            sync,
            active: None,
        };
        let post_id = watcher.sync.post_id();
        watcher.open(&post_id)?;
        Ok(watcher)
    }

    /// Post currently subscribed to
    pub fn post_id(&self) -> Option<&PostId> {
        self.active.as_ref().map(|active| active.guard.post_id())
    }

    pub fn is_attached(&self) -> bool {
        self.active.is_some()
    }

    /// Move the subscription to another post. The old one is closed first.
    pub fn retarget(&mut self, post_id: &PostId) -> SyncResult<()> {
        self.detach();
        self.open(post_id)
    }

    /// Close the subscription. Safe to call more than once.
    pub fn detach(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(post_id = %active.guard.post_id(), "Like watcher detached");
            active.guard.unsubscribe();
            active.task.abort();
        }
    }

    fn open(&mut self, post_id: &PostId) -> SyncResult<()> {
        let (events, guard) = self.feed.subscribe(post_id)?.into_parts();
        let task = tokio::spawn(reload_on_change(events, self.sync.clone()));

        tracing::debug!(post_id = %post_id, "Like watcher attached");
        self.active = Some(ActiveWatch { guard, task });
        Ok(())
    }
}

impl Drop for LikeWatcher {
    fn drop(&mut self) {
        self.detach();
    }
}

async fn reload_on_change(mut events: LikeEvents, sync: LikeSync) {
    while let Some(change) = events.next().await {
        // A burst of notifications needs only one reload
        let skipped = events.drain_pending();
        tracing::trace!(post_id = %change.post_id, kind = ?change.kind, skipped, "Like change received");

        match sync.load().await {
            Ok(_) => {}
            Err(e) if e.is_discarded() => {
                if !sync.is_attached() {
                    break;
                }
            }
            Err(e) => tracing::warn!(post_id = %change.post_id, error = %e, "Reload after like change failed"),
        }
    }
}
