//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::PostIdParseError;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid post id: {0}")]
    InvalidPostId(#[from] PostIdParseError),

    #[error("Invalid actor: {0}")]
    InvalidActor(String),

    // =========================================================================
    // Conflict / Not Found
    // =========================================================================
    #[error("Like already exists")]
    LikeAlreadyExists,

    #[error("Like not found")]
    LikeNotFound,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    /// Network failure or 5xx from the like store; safe to retry
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPostId(_) => "INVALID_POST_ID",
            Self::InvalidActor(_) => "INVALID_ACTOR",
            Self::LikeAlreadyExists => "LIKE_ALREADY_EXISTS",
            Self::LikeNotFound => "LIKE_NOT_FOUND",
            Self::Backend(_) => "BACKEND_ERROR",
            Self::Unavailable(_) => "BACKEND_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Unavailable(_))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LikeNotFound)
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidPostId(_) | Self::InvalidActor(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::LikeAlreadyExists)
    }
}
