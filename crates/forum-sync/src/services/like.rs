//! Like service
//!
//! Relay-side use cases: read a post's like summary, add or remove the
//! caller's like, and open a change subscription.

use forum_core::traits::{DeleteOutcome, InsertOutcome};
use forum_core::{Actor, DomainError, LikeRecord, LikeSubscription, PostId};
use tracing::{info, instrument};

use crate::dto::{LikeCountResponse, LikeStatusResponse, LikeSummaryResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Like service
pub struct LikeService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LikeService<'a> {
    /// Create a new LikeService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Like count of a post and whether the actor has liked it
    #[instrument(skip(self))]
    pub async fn get_summary(
        &self,
        post_id: &PostId,
        actor: &Actor,
    ) -> ServiceResult<LikeSummaryResponse> {
        let repo = self.ctx.like_repo();
        let (count, liked) = tokio::try_join!(repo.count(post_id), repo.has_liked(post_id, actor))?;

        Ok(LikeSummaryResponse {
            post_id: post_id.to_string(),
            count,
            liked,
        })
    }

    /// Like count of a post
    #[instrument(skip(self))]
    pub async fn get_count(&self, post_id: &PostId) -> ServiceResult<LikeCountResponse> {
        let count = self.ctx.like_repo().count(post_id).await?;
        Ok(LikeCountResponse {
            post_id: post_id.to_string(),
            count,
        })
    }

    /// Whether the actor has liked a post
    #[instrument(skip(self))]
    pub async fn get_status(&self, post_id: &PostId, actor: &Actor) -> ServiceResult<LikeStatusResponse> {
        let liked = self.ctx.like_repo().has_liked(post_id, actor).await?;
        Ok(LikeStatusResponse {
            post_id: post_id.to_string(),
            liked,
        })
    }

    /// Add the actor's like
    ///
    /// # Errors
    /// `LikeAlreadyExists` if the actor already liked the post
    #[instrument(skip(self))]
    pub async fn add_like(&self, post_id: &PostId, actor: &Actor) -> ServiceResult<()> {
        let record = LikeRecord::new(post_id.clone(), actor.clone());

        match self.ctx.like_repo().insert(&record).await? {
            InsertOutcome::Inserted => {
                info!(
                    post_id = %post_id,
                    actor = %actor,
                    verified = actor.is_verified(),
                    "Like added"
                );
                Ok(())
            }
            InsertOutcome::Duplicate => Err(DomainError::LikeAlreadyExists.into()),
        }
    }

    /// Remove the actor's like
    ///
    /// # Errors
    /// `LikeNotFound` if there was nothing to remove
    #[instrument(skip(self))]
    pub async fn remove_like(&self, post_id: &PostId, actor: &Actor) -> ServiceResult<()> {
        match self.ctx.like_repo().delete(post_id, actor).await? {
            DeleteOutcome::Deleted => {
                info!(post_id = %post_id, actor = %actor, "Like removed");
                Ok(())
            }
            DeleteOutcome::NotFound => Err(DomainError::LikeNotFound.into()),
        }
    }

    /// Open a change subscription for a post
    pub fn subscribe(&self, post_id: &PostId) -> ServiceResult<LikeSubscription> {
        Ok(self.ctx.like_feed().subscribe(post_id)?)
    }
}
