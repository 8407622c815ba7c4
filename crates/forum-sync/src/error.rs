//! Synchronizer error type

use forum_core::DomainError;

use crate::machine::TransitionError;

/// Errors surfaced by the like synchronizer
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The consumer was unmounted; the result was discarded
    #[error("synchronizer detached")]
    Detached,

    /// The consumer moved to another post while the call was in flight
    #[error("result superseded by a newer post")]
    Superseded,

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl SyncError {
    /// Whether repeating the call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether the result was dropped because the consumer moved on
    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Detached | Self::Superseded)
    }
}

/// Result type for synchronizer operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::LikePhase;

    #[test]
    fn test_retryable() {
        assert!(SyncError::from(DomainError::Backend("503".to_string())).is_retryable());
        assert!(!SyncError::from(DomainError::InvalidActor("x".to_string())).is_retryable());
        assert!(!SyncError::Detached.is_retryable());
    }

    #[test]
    fn test_discarded() {
        assert!(SyncError::Detached.is_discarded());
        assert!(SyncError::Superseded.is_discarded());
        let err = SyncError::from(TransitionError {
            from: LikePhase::Loading,
            event: "ToggleStarted",
        });
        assert!(!err.is_discarded());
    }
}
