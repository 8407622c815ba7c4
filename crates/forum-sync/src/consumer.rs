//! Mounted like consumer
//!
//! Ties one synchronizer, its change subscription and its display count to
//! the lifetime of a UI component. Dropping the consumer unmounts it.

use std::sync::Arc;

use tokio::sync::watch;

use forum_core::{Actor, LikeViewState, PostId};

use crate::error::SyncResult;
use crate::machine::LikePhase;
use crate::realtime::LikeWatcher;
use crate::services::ServiceContext;
use crate::synchronizer::{LikeSync, ToggleOutcome};
use crate::unified::UnifiedLikeCount;

/// A like widget bound to one post at a time
pub struct LikeConsumer {
    sync: LikeSync,
    watcher: LikeWatcher,
    unified: UnifiedLikeCount,
}

/// A freshly mounted consumer and the outcome of its first load.
///
/// A failed first load still leaves a usable consumer; the next change
/// notification or an explicit [`LikeConsumer::reload`] retries it.
pub struct Mounted {
    pub consumer: LikeConsumer,
    pub initial_load: SyncResult<LikeViewState>,
}

impl LikeConsumer {
    /// Subscribe to `post_id` and load its like state.
    ///
    /// # Errors
    /// Returns an error only when the change subscription cannot be opened.
    pub async fn mount(ctx: &ServiceContext, post_id: PostId, actor: Actor) -> SyncResult<Mounted> {
        let sync = LikeSync::new(ctx, post_id, actor);
        let watcher = LikeWatcher::attach(Arc::clone(ctx.like_feed()), sync.clone())?;
        let unified = UnifiedLikeCount::spawn(sync.clone(), ctx.ledger().cloned()).await;

        tracing::debug!(post_id = %sync.post_id(), actor = %sync.actor(), "Like consumer mounted");
        let initial_load = sync.load_with_retry().await;

        Ok(Mounted {
            consumer: Self {
                sync,
                watcher,
                unified,
            },
            initial_load,
        })
    }

    pub fn post_id(&self) -> PostId {
        self.sync.post_id()
    }

    pub fn actor(&self) -> &Actor {
        self.sync.actor()
    }

    pub fn phase(&self) -> LikePhase {
        self.sync.phase()
    }

    pub fn view(&self) -> LikeViewState {
        self.sync.view()
    }

    pub fn views(&self) -> watch::Receiver<LikeViewState> {
        self.sync.subscribe()
    }

    /// Count to display, including pending guest likes from this device
    pub fn display_count(&self) -> u64 {
        self.unified.get()
    }

    pub fn display_counts(&self) -> watch::Receiver<u64> {
        self.unified.subscribe()
    }

    pub async fn toggle(&self) -> SyncResult<ToggleOutcome> {
        self.sync.toggle().await
    }

    pub async fn reload(&self) -> SyncResult<LikeViewState> {
        self.sync.load_with_retry().await
    }

    /// Point the consumer at another post.
    ///
    /// The old subscription is closed before the new one opens, and any
    /// result still in flight for the old post is discarded.
    pub async fn set_post(&mut self, post_id: PostId) -> SyncResult<LikeViewState> {
        if post_id == self.sync.post_id() {
            return Ok(self.sync.view());
        }

        self.sync.retarget(post_id.clone());
        self.watcher.retarget(&post_id)?;
        self.sync.load_with_retry().await
    }

    /// Close the subscription and stop accepting results
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for LikeConsumer {
    fn drop(&mut self) {
        self.sync.detach();
        self.watcher.detach();
        tracing::debug!(post_id = %self.sync.post_id(), "Like consumer unmounted");
    }
}

impl std::fmt::Debug for LikeConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikeConsumer")
            .field("sync", &self.sync)
            .field("subscribed", &self.watcher.post_id())
            .field("display_count", &self.unified.get())
            .finish()
    }
}
