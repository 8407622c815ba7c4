//! Repository traits (ports) - define the interface for like storage
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! (Postgres in `forum-db`, the HTTP relay client in `forum-sync`) provides
//! the implementation.

use async_trait::async_trait;

use crate::entities::LikeRecord;
use crate::error::DomainError;
use crate::value_objects::{Actor, PostId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Result of inserting a like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The actor already had a like on this post
    Duplicate,
}

/// Result of deleting a like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// There was no like to delete (e.g. removed from another tab)
    NotFound,
}

// ============================================================================
// Like Repository
// ============================================================================

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Total number of likes on a post
    async fn count(&self, post_id: &PostId) -> RepoResult<u64>;

    /// Whether the actor has liked the post
    async fn has_liked(&self, post_id: &PostId, actor: &Actor) -> RepoResult<bool>;

    /// Insert a like, reporting a uniqueness conflict as `Duplicate`
    async fn insert(&self, record: &LikeRecord) -> RepoResult<InsertOutcome>;

    /// Delete the actor's like, reporting a missing row as `NotFound`
    async fn delete(&self, post_id: &PostId, actor: &Actor) -> RepoResult<DeleteOutcome>;
}
