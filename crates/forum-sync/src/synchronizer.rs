//! Like state synchronizer
//!
//! Owns the [`LikeMachine`] of one mounted consumer and drives it from
//! backend calls. Every backend call is stamped with the epoch it started
//! in; results from an older epoch or a detached consumer are dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use forum_cache::LikeCountCache;
use forum_common::SyncConfig;
use forum_core::traits::{DeleteOutcome, InsertOutcome, LikeRepository};
use forum_core::{Actor, DomainError, LikeRecord, LikeViewState, PostId};

use crate::error::{SyncError, SyncResult};
use crate::machine::{LikeEvent, LikeMachine, LikePhase};
use crate::services::ServiceContext;

/// Result of a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Another toggle was in flight, or the first load has not completed
    Ignored,
    /// The backend applied the like or unlike
    Applied { liked: bool },
    /// The backend already held the requested state
    Reconciled { liked: bool },
}

struct SyncState {
    post_id: PostId,
    epoch: u64,
    attached: bool,
    machine: LikeMachine,
}

struct Inner {
    likes: Arc<dyn LikeRepository>,
    actor: Actor,
    ledger: Option<Arc<LikeCountCache>>,
    config: SyncConfig,
    state: Mutex<SyncState>,
    view_tx: watch::Sender<LikeViewState>,
}

/// Like state synchronizer for one consumer.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct LikeSync {
    inner: Arc<Inner>,
}

impl LikeSync {
    pub fn new(ctx: &ServiceContext, post_id: PostId, actor: Actor) -> Self {
        let (view_tx, _) = watch::channel(LikeViewState::default());
        Self {
            inner: Arc::new(Inner {
                likes: Arc::clone(ctx.like_repo()),
                // Only guest likes go through the ledger
                ledger: ctx.ledger().filter(|_| actor.is_guest()).cloned(),
                actor,
                config: ctx.sync_config().clone(),
                state: Mutex::new(SyncState {
                    post_id,
                    epoch: 0,
                    attached: true,
                    machine: LikeMachine::new(),
                }),
                view_tx,
            }),
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.inner.actor
    }

    pub fn post_id(&self) -> PostId {
        self.inner.state.lock().post_id.clone()
    }

    pub fn view(&self) -> LikeViewState {
        self.inner.state.lock().machine.view()
    }

    pub fn phase(&self) -> LikePhase {
        self.inner.state.lock().machine.phase()
    }

    pub fn epoch(&self) -> u64 {
        self.inner.state.lock().epoch
    }

    pub fn is_attached(&self) -> bool {
        self.inner.state.lock().attached
    }

    /// Receive every published view
    pub fn subscribe(&self) -> watch::Receiver<LikeViewState> {
        self.inner.view_tx.subscribe()
    }

    /// Switch to another post. Results of calls started before are discarded.
    pub fn retarget(&self, post_id: PostId) {
        let mut state = self.inner.state.lock();
        state.epoch += 1;
        state.post_id = post_id;
        state.machine = LikeMachine::new();
        self.inner.view_tx.send_replace(state.machine.view());
        tracing::debug!(post_id = %state.post_id, epoch = state.epoch, "Synchronizer retargeted");
    }

    /// Stop accepting results; called on unmount
    pub fn detach(&self) {
        let mut state = self.inner.state.lock();
        state.attached = false;
        state.epoch += 1;
    }

    /// Fetch count and liked flag from the backend.
    ///
    /// A failure leaves the view unchanged and is returned to the caller.
    pub async fn load(&self) -> SyncResult<LikeViewState> {
        let (post_id, epoch) = self.ticket()?;
        let likes = &self.inner.likes;

        let result = tokio::try_join!(
            likes.count(&post_id),
            likes.has_liked(&post_id, &self.inner.actor)
        );

        match result {
            Ok((count, liked)) => self.commit(epoch, LikeEvent::Loaded { count, liked }),
            Err(e) => {
                self.commit(epoch, LikeEvent::LoadFailed)?;
                tracing::warn!(post_id = %post_id, error = %e, "Like load failed");
                Err(e.into())
            }
        }
    }

    /// `load` with exponential backoff on transient failures
    pub async fn load_with_retry(&self) -> SyncResult<LikeViewState> {
        let mut attempt = 0;
        loop {
            match self.load().await {
                Err(e) if e.is_retryable() && attempt < self.inner.config.max_retries => {
                    let delay = self.inner.config.backoff(attempt);
                    tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying like load");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Like or unlike with an optimistic update.
    ///
    /// Duplicate inserts and missing deletes are reconciled silently. Any
    /// other failure restores the pre-toggle view and is returned.
    ///
    /// Once the optimistic update is applied the mutation runs on its own
    /// task, so dropping the returned future still settles the toggle.
    pub async fn toggle(&self) -> SyncResult<ToggleOutcome> {
        let (post_id, epoch, liking) = {
            let mut state = self.inner.state.lock();
            if !state.attached {
                return Err(SyncError::Detached);
            }
            if state.machine.phase() != LikePhase::Ready {
                tracing::debug!(post_id = %state.post_id, phase = %state.machine.phase(), "Toggle ignored");
                return Ok(ToggleOutcome::Ignored);
            }
            let liking = !state.machine.view().is_liked_by_actor;
            state.machine.apply(LikeEvent::ToggleStarted)?;
            self.inner.view_tx.send_replace(state.machine.view());
            (state.post_id.clone(), state.epoch, liking)
        };

        let sync = self.clone();
        tokio::spawn(async move { sync.settle_toggle(post_id, epoch, liking).await })
            .await
            .map_err(|e| DomainError::Internal(format!("toggle task failed: {e}")))?
    }

    async fn settle_toggle(
        &self,
        post_id: PostId,
        epoch: u64,
        liking: bool,
    ) -> SyncResult<ToggleOutcome> {
        let delta = if liking { 1 } else { -1 };
        if let Some(ledger) = &self.inner.ledger {
            ledger.record(&post_id, delta).await;
        }

        let result = if liking {
            let record = LikeRecord::new(post_id.clone(), self.inner.actor.clone());
            self.inner.likes.insert(&record).await.map(|outcome| match outcome {
                InsertOutcome::Inserted => ToggleOutcome::Applied { liked: true },
                InsertOutcome::Duplicate => ToggleOutcome::Reconciled { liked: true },
            })
        } else {
            self.inner
                .likes
                .delete(&post_id, &self.inner.actor)
                .await
                .map(|outcome| match outcome {
                    DeleteOutcome::Deleted => ToggleOutcome::Applied { liked: false },
                    DeleteOutcome::NotFound => ToggleOutcome::Reconciled { liked: false },
                })
        };

        // The optimistic view still covers the delta while Toggling, so the
        // ledger is settled before the machine leaves it.
        if let Some(ledger) = &self.inner.ledger {
            ledger.record(&post_id, -delta).await;
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.commit(epoch, LikeEvent::ToggleRolledBack)?;
                tracing::warn!(post_id = %post_id, error = %e, "Like toggle rolled back");
                return Err(e.into());
            }
        };

        let event = match outcome {
            ToggleOutcome::Applied { liked } => LikeEvent::ToggleConfirmed { liked },
            ToggleOutcome::Reconciled { liked } => {
                tracing::warn!(post_id = %post_id, liked, "Like state reconciled with backend");
                LikeEvent::ToggleReconciled { liked }
            }
            ToggleOutcome::Ignored => return Ok(outcome),
        };
        self.commit(epoch, event)?;

        // Fold in the server count, which may include other actors' changes
        if let Err(e) = self.load().await {
            if !e.is_discarded() {
                tracing::warn!(post_id = %post_id, error = %e, "Confirming load failed");
            }
        }

        Ok(outcome)
    }

    fn ticket(&self) -> SyncResult<(PostId, u64)> {
        let state = self.inner.state.lock();
        if !state.attached {
            return Err(SyncError::Detached);
        }
        Ok((state.post_id.clone(), state.epoch))
    }

    /// Apply an event if the call that produced it is still current
    fn commit(&self, epoch: u64, event: LikeEvent) -> SyncResult<LikeViewState> {
        let mut state = self.inner.state.lock();
        if !state.attached {
            return Err(SyncError::Detached);
        }
        if state.epoch != epoch {
            tracing::debug!(event = event.name(), "Discarding stale result");
            return Err(SyncError::Superseded);
        }

        state.machine.apply(event)?;
        let view = state.machine.view();
        self.inner.view_tx.send_replace(view);
        Ok(view)
    }
}

impl std::fmt::Debug for LikeSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("LikeSync")
            .field("post_id", &state.post_id)
            .field("actor", &self.inner.actor)
            .field("phase", &state.machine.phase())
            .field("view", &state.machine.view())
            .field("epoch", &state.epoch)
            .field("attached", &state.attached)
            .finish()
    }
}
