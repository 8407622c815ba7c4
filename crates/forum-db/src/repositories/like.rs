//! PostgreSQL implementation of LikeRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use forum_core::traits::{DeleteOutcome, InsertOutcome, LikeRepository, RepoResult};
use forum_core::{Actor, DomainError, LikeRecord, PostId};

use crate::mappers::LikeInsert;

use super::error::{is_unique_violation, map_db_error};

/// PostgreSQL implementation of LikeRepository
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    /// Create a new PgLikeRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    #[instrument(skip(self))]
    async fn count(&self, post_id: &PostId) -> RepoResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM post_likes WHERE post_id = $1
            "#,
        )
        .bind(post_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        u64::try_from(count)
            .map_err(|_| DomainError::Internal(format!("negative like count {count}")))
    }

    #[instrument(skip(self))]
    async fn has_liked(&self, post_id: &PostId, actor: &Actor) -> RepoResult<bool> {
        let sql = match actor {
            Actor::Authenticated { .. } => {
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM post_likes WHERE post_id = $1 AND user_id = $2
                )
                "#
            }
            Actor::Guest { .. } => {
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM post_likes WHERE post_id = $1 AND guest_session_id = $2
                )
                "#
            }
        };

        sqlx::query_scalar::<_, bool>(sql)
            .bind(post_id.as_str())
            .bind(actor.key())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn insert(&self, record: &LikeRecord) -> RepoResult<InsertOutcome> {
        let values = LikeInsert::new(record);

        let result = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id, guest_session_id, is_verified, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(values.post_id)
        .bind(values.user_id)
        .bind(values.guest_session_id)
        .bind(values.is_verified)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(post_id = %record.post_id, actor = %record.actor, "Like inserted");
                Ok(InsertOutcome::Inserted)
            }
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(map_db_error(e)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, post_id: &PostId, actor: &Actor) -> RepoResult<DeleteOutcome> {
        let sql = match actor {
            Actor::Authenticated { .. } => {
                r#"
                DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2
                "#
            }
            Actor::Guest { .. } => {
                r#"
                DELETE FROM post_likes WHERE post_id = $1 AND guest_session_id = $2
                "#
            }
        };

        let result = sqlx::query(sql)
            .bind(post_id.as_str())
            .bind(actor.key())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Ok(DeleteOutcome::NotFound);
        }

        info!(post_id = %post_id, actor = %actor, "Like deleted");
        Ok(DeleteOutcome::Deleted)
    }
}
