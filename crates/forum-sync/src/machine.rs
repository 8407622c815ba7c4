//! Like state machine
//!
//! The per-consumer state of one post's likes as an explicit transition
//! table. Optimistic toggles keep a snapshot of the last confirmed view so a
//! failed mutation can restore it exactly.

use std::fmt;

use forum_core::LikeViewState;

/// Lifecycle phase of a synchronizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikePhase {
    /// Waiting for the first successful load
    Loading,
    Ready,
    /// A like or unlike is in flight
    Toggling,
}

/// Input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeEvent {
    /// Canonical values read from the backend
    Loaded { count: u64, liked: bool },
    LoadFailed,
    /// User toggled; apply the optimistic change
    ToggleStarted,
    /// Backend applied the mutation
    ToggleConfirmed { liked: bool },
    /// Backend already held the requested state (duplicate insert or missing
    /// delete); keep the pre-toggle count with the given liked flag
    ToggleReconciled { liked: bool },
    /// Mutation failed; restore the snapshot
    ToggleRolledBack,
}

impl LikeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "Loaded",
            Self::LoadFailed => "LoadFailed",
            Self::ToggleStarted => "ToggleStarted",
            Self::ToggleConfirmed { .. } => "ToggleConfirmed",
            Self::ToggleReconciled { .. } => "ToggleReconciled",
            Self::ToggleRolledBack => "ToggleRolledBack",
        }
    }
}

/// Event not accepted in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event} while {from}")]
pub struct TransitionError {
    pub from: LikePhase,
    pub event: &'static str,
}

impl fmt::Display for LikePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loading => "Loading",
            Self::Ready => "Ready",
            Self::Toggling => "Toggling",
        };
        f.write_str(name)
    }
}

/// State of one post's likes as seen by one consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeMachine {
    phase: LikePhase,
    view: LikeViewState,
    /// Confirmed view to restore on rollback; set only while Toggling
    snapshot: Option<LikeViewState>,
}

impl Default for LikeMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LikeMachine {
    /// Provisional machine: Loading, zero likes, not liked
    pub fn new() -> Self {
        Self {
            phase: LikePhase::Loading,
            view: LikeViewState::default(),
            snapshot: None,
        }
    }

    #[inline]
    pub fn phase(&self) -> LikePhase {
        self.phase
    }

    #[inline]
    pub fn view(&self) -> LikeViewState {
        self.view
    }

    pub fn snapshot(&self) -> Option<LikeViewState> {
        self.snapshot
    }

    /// Apply an event, returning the new phase.
    ///
    /// Rejected events leave the machine untouched.
    pub fn apply(&mut self, event: LikeEvent) -> Result<LikePhase, TransitionError> {
        use LikeEvent as E;
        use LikePhase as P;

        match (self.phase, event) {
            (P::Loading | P::Ready, E::Loaded { count, liked }) => {
                self.view = LikeViewState::confirmed(count, liked);
                self.phase = P::Ready;
            }
            (P::Loading | P::Ready, E::LoadFailed) => {}
            (P::Ready, E::ToggleStarted) => {
                let before = self.view;
                self.snapshot = Some(before);
                self.view = LikeViewState {
                    count: if before.is_liked_by_actor {
                        before.count.saturating_sub(1)
                    } else {
                        before.count.saturating_add(1)
                    },
                    confirmed_count: before.confirmed_count,
                    is_liked_by_actor: !before.is_liked_by_actor,
                    pending: true,
                };
                self.phase = P::Toggling;
            }
            (P::Toggling, E::Loaded { count, liked }) => {
                // Last completed load is canonical; the optimistic view stays
                // until the mutation settles.
                self.snapshot = Some(LikeViewState::confirmed(count, liked));
            }
            (P::Toggling, E::LoadFailed) => {}
            (P::Toggling, E::ToggleConfirmed { liked }) => {
                self.view = LikeViewState::confirmed(self.view.count, liked);
                self.snapshot = None;
                self.phase = P::Ready;
            }
            (P::Toggling, E::ToggleReconciled { liked }) => {
                let base = self.snapshot.take().unwrap_or(self.view);
                self.view = LikeViewState::confirmed(base.count, liked);
                self.phase = P::Ready;
            }
            (P::Toggling, E::ToggleRolledBack) => {
                if let Some(snapshot) = self.snapshot.take() {
                    self.view = snapshot;
                }
                self.view.pending = false;
                self.phase = P::Ready;
            }
            (from, event) => {
                return Err(TransitionError {
                    from,
                    event: event.name(),
                })
            }
        }

        tracing::debug!(event = event.name(), phase = %self.phase, count = self.view.count, liked = self.view.is_liked_by_actor, "Like transition");
        Ok(self.phase)
    }
}
