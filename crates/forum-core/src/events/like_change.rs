//! Like change notification pushed by the realtime feed
//!
//! Consumers only rely on "this post changed"; the kind is informational and
//! every notification triggers a full reload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::PostId;

/// What happened to a post's likes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LikeChangeKind {
    Inserted,
    Deleted,
    /// The feed reconnected and may have missed changes
    Resync,
}

/// A change to the like records of one post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeChange {
    pub post_id: PostId,
    pub kind: LikeChangeKind,
    pub timestamp: DateTime<Utc>,
}

impl LikeChange {
    pub fn new(post_id: PostId, kind: LikeChangeKind) -> Self {
        Self {
            post_id,
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn inserted(post_id: PostId) -> Self {
        Self::new(post_id, LikeChangeKind::Inserted)
    }

    pub fn deleted(post_id: PostId) -> Self {
        Self::new(post_id, LikeChangeKind::Deleted)
    }

    pub fn resync(post_id: PostId) -> Self {
        Self::new(post_id, LikeChangeKind::Resync)
    }

    /// Event type name used on the wire
    pub fn event_type(&self) -> &'static str {
        "LIKE_CHANGE"
    }
}
