//! Response DTOs for relay endpoints
//!
//! The remote client deserializes the same types, so they derive both
//! `Serialize` and `Deserialize`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forum_core::{LikeChange, LikeChangeKind, PostId};

// ============================================================================
// Like Responses
// ============================================================================

/// Like count and the actor's like status for one post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeSummaryResponse {
    pub post_id: String,
    pub count: u64,
    pub liked: bool,
}

/// Like count of one post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeCountResponse {
    pub post_id: String,
    pub count: u64,
}

/// Whether the actor has liked one post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatusResponse {
    pub post_id: String,
    pub liked: bool,
}

/// Change notification pushed on the like WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeChangeMessage {
    #[serde(rename = "type")]
    pub event_type: String,
    pub post_id: PostId,
    pub kind: LikeChangeKind,
}

impl From<&LikeChange> for LikeChangeMessage {
    fn from(change: &LikeChange) -> Self {
        Self {
            event_type: change.event_type().to_string(),
            post_id: change.post_id.clone(),
            kind: change.kind,
        }
    }
}

impl From<LikeChangeMessage> for LikeChange {
    fn from(message: LikeChangeMessage) -> Self {
        LikeChange::new(message.post_id, message.kind)
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<String>,
}

fn health_label(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

impl ReadinessResponse {
    /// `redis_healthy` is `None` when Redis is not configured
    pub fn ready(database_healthy: bool, redis_healthy: Option<bool>) -> Self {
        let all_healthy = database_healthy && redis_healthy.unwrap_or(true);
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: health_label(database_healthy),
                redis: redis_healthy.map(health_label),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
