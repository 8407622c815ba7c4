//! Like entities - a stored like and the per-consumer view of a post's likes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Actor, PostId};

/// A like stored by the backend.
///
/// At most one record exists per (post, actor key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeRecord {
    pub post_id: PostId,
    pub actor: Actor,
    pub created_at: DateTime<Utc>,
}

impl LikeRecord {
    /// Create a new LikeRecord
    pub fn new(post_id: PostId, actor: Actor) -> Self {
        Self {
            post_id,
            actor,
            created_at: Utc::now(),
        }
    }

    /// Whether the like was issued by a signed-in user
    #[inline]
    pub fn is_verified(&self) -> bool {
        self.actor.is_verified()
    }
}

/// What one mounted consumer currently shows for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LikeViewState {
    /// Displayed like count, possibly optimistic
    pub count: u64,
    /// Last count confirmed by the backend
    pub confirmed_count: u64,
    /// Whether the current actor has liked the post
    pub is_liked_by_actor: bool,
    /// True while a toggle is in flight
    pub pending: bool,
}

impl LikeViewState {
    /// Confirmed state straight from the backend
    pub fn confirmed(count: u64, is_liked_by_actor: bool) -> Self {
        Self {
            count,
            confirmed_count: count,
            is_liked_by_actor,
            pending: false,
        }
    }

    /// Whether the displayed count differs from the confirmed one
    #[inline]
    pub fn is_optimistic(&self) -> bool {
        self.pending || self.count != self.confirmed_count
    }
}
