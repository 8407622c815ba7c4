//! Actor - who is liking a post

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length of a user id or guest session id
pub const MAX_ACTOR_KEY_LEN: usize = 128;

/// The entity performing a like or unlike.
///
/// Exactly one identity is carried; whether the like counts as verified is
/// derived from the variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// Signed-in user
    Authenticated { user_id: String },
    /// Anonymous visitor identified by a locally persisted session id
    Guest { session_id: String },
}

impl Actor {
    /// Create an authenticated actor
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self::Authenticated {
            user_id: user_id.into(),
        }
    }

    /// Create a guest actor
    pub fn guest(session_id: impl Into<String>) -> Self {
        Self::Guest {
            session_id: session_id.into(),
        }
    }

    /// Build an actor from optional user and guest ids.
    ///
    /// Exactly one of the two must be present and non-empty.
    pub fn from_parts(
        user_id: Option<String>,
        guest_session_id: Option<String>,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.filter(|s| !s.trim().is_empty());
        let guest_session_id = guest_session_id.filter(|s| !s.trim().is_empty());

        let actor = match (user_id, guest_session_id) {
            (Some(user_id), None) => Self::Authenticated { user_id },
            (None, Some(session_id)) => Self::Guest { session_id },
            (Some(_), Some(_)) => {
                return Err(DomainError::InvalidActor(
                    "user_id and guest_session_id are mutually exclusive".to_string(),
                ))
            }
            (None, None) => {
                return Err(DomainError::InvalidActor(
                    "one of user_id or guest_session_id is required".to_string(),
                ))
            }
        };

        if actor.key().len() > MAX_ACTOR_KEY_LEN {
            return Err(DomainError::InvalidActor(format!(
                "actor key too long: max {MAX_ACTOR_KEY_LEN} bytes"
            )));
        }

        Ok(actor)
    }

    /// The actor key stored alongside the like
    #[inline]
    pub fn key(&self) -> &str {
        match self {
            Self::Authenticated { user_id } => user_id,
            Self::Guest { session_id } => session_id,
        }
    }

    /// True iff the actor is a signed-in user
    #[inline]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[inline]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest { .. })
    }

    /// User id, if authenticated
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Authenticated { user_id } => Some(user_id),
            Self::Guest { .. } => None,
        }
    }

    /// Guest session id, if anonymous
    pub fn guest_session_id(&self) -> Option<&str> {
        match self {
            Self::Authenticated { .. } => None,
            Self::Guest { session_id } => Some(session_id),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated { user_id } => write!(f, "user:{user_id}"),
            Self::Guest { session_id } => write!(f, "guest:{session_id}"),
        }
    }
}
