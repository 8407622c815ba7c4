//! Realtime change feed port and the subscription handle it returns

use std::fmt;

use tokio::sync::mpsc;

use crate::error::DomainError;
use crate::events::LikeChange;
use crate::value_objects::PostId;

/// Source of like change notifications, filtered per post.
pub trait LikeChangeFeed: Send + Sync {
    /// Open a subscription to changes of one post's likes.
    ///
    /// The returned handle owns the subscription: dropping it or calling
    /// [`LikeSubscription::unsubscribe`] closes it.
    fn subscribe(&self, post_id: &PostId) -> Result<LikeSubscription, DomainError>;
}

type CancelHook = Box<dyn FnOnce() + Send + 'static>;

/// Open subscription to one post's change notifications.
///
/// The cancel hook runs exactly once, on `unsubscribe` or on drop,
/// whichever comes first.
pub struct LikeSubscription {
    post_id: PostId,
    events: LikeEvents,
    cancel: Option<CancelHook>,
}

impl LikeSubscription {
    /// Create a subscription from a receiver and a cancel hook
    pub fn new(
        post_id: PostId,
        events: mpsc::Receiver<LikeChange>,
        cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            post_id,
            events: LikeEvents { rx: events },
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Post this subscription is filtered to
    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    /// Wait for the next change. Returns `None` once the feed is closed.
    pub async fn next(&mut self) -> Option<LikeChange> {
        self.events.next().await
    }

    /// See [`LikeEvents::drain_pending`]
    pub fn drain_pending(&mut self) -> usize {
        self.events.drain_pending()
    }

    /// Whether the cancel hook has already run
    pub fn is_closed(&self) -> bool {
        self.cancel.is_none()
    }

    /// Close the subscription
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    /// Split into the receiving half and a guard owning the cancel hook.
    ///
    /// Lets one task consume notifications while its owner keeps the power
    /// to close the subscription synchronously.
    pub fn into_parts(mut self) -> (LikeEvents, SubscriptionGuard) {
        let (_, closed) = mpsc::channel(1);
        let events = std::mem::replace(&mut self.events, LikeEvents { rx: closed });
        let guard = SubscriptionGuard {
            post_id: self.post_id.clone(),
            cancel: self.cancel.take(),
        };
        (events, guard)
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            self.events.rx.close();
            cancel();
        }
    }
}

impl Drop for LikeSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Receiving half of a [`LikeSubscription`]
pub struct LikeEvents {
    rx: mpsc::Receiver<LikeChange>,
}

impl LikeEvents {
    /// Wait for the next change. Returns `None` once the feed is closed.
    pub async fn next(&mut self) -> Option<LikeChange> {
        self.rx.recv().await
    }

    /// Drain notifications that are already queued without waiting.
    ///
    /// Returns how many were dropped. Each notification only means "reload",
    /// so a burst collapses into one.
    pub fn drain_pending(&mut self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

/// Cancel half of a split [`LikeSubscription`]
pub struct SubscriptionGuard {
    post_id: PostId,
    cancel: Option<CancelHook>,
}

impl SubscriptionGuard {
    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    /// Close the subscription
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("post_id", &self.post_id)
            .field("closed", &self.cancel.is_none())
            .finish()
    }
}

impl fmt::Debug for LikeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LikeSubscription")
            .field("post_id", &self.post_id)
            .field("closed", &self.cancel.is_none())
            .finish()
    }
}
