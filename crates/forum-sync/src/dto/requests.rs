//! Request DTOs for relay endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use forum_core::{Actor, DomainError};

// ============================================================================
// Like Requests
// ============================================================================

/// Actor identification carried in the query string of like endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_single_actor", skip_on_field_errors = false))]
pub struct ActorQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128, message = "user_id must be 1-128 characters"))]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(
        min = 1,
        max = 128,
        message = "guest_session_id must be 1-128 characters"
    ))]
    pub guest_session_id: Option<String>,
}

impl ActorQuery {
    /// Query string identifying an actor
    pub fn from_actor(actor: &Actor) -> Self {
        Self {
            user_id: actor.user_id().map(String::from),
            guest_session_id: actor.guest_session_id().map(String::from),
        }
    }

    /// Convert into an actor
    pub fn into_actor(self) -> Result<Actor, DomainError> {
        Actor::from_parts(self.user_id, self.guest_session_id)
    }
}

fn validate_single_actor(query: &ActorQuery) -> Result<(), ValidationError> {
    match (&query.user_id, &query.guest_session_id) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        (Some(_), Some(_)) => Err(ValidationError::new("actor")
            .with_message("user_id and guest_session_id are mutually exclusive".into())),
        (None, None) => Err(ValidationError::new("actor")
            .with_message("one of user_id or guest_session_id is required".into())),
    }
}
