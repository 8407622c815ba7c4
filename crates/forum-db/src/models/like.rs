//! Like database models

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;

/// Database model for the post_likes table
#[derive(Debug, Clone, FromRow)]
pub struct LikeModel {
    pub post_id: String,
    pub user_id: Option<String>,
    pub guest_session_id: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload of a `post_likes` NOTIFY, as built by the notify trigger
#[derive(Debug, Clone, Deserialize)]
pub struct LikeNotification {
    /// TG_OP of the row change: INSERT, UPDATE or DELETE
    pub op: String,
    pub post_id: String,
}
