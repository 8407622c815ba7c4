//! Test fixtures and data generators

use forum_core::{Actor, PostId};
use serde::Deserialize;

/// Fresh post id, so tests sharing a database never see each other's likes
pub fn unique_post_id() -> PostId {
    PostId::parse(format!("it-post-{}", uuid::Uuid::new_v4().simple()))
        .expect("uuid post id is valid")
}

pub fn unique_user() -> Actor {
    Actor::authenticated(format!("it-user-{}", uuid::Uuid::new_v4().simple()))
}

pub fn unique_guest() -> Actor {
    Actor::guest(forum_cache::generate_session_id())
}

/// Query string identifying an actor
pub fn actor_query(actor: &Actor) -> String {
    match (actor.user_id(), actor.guest_session_id()) {
        (Some(user_id), _) => format!("user_id={user_id}"),
        (_, Some(session_id)) => format!("guest_session_id={session_id}"),
        _ => String::new(),
    }
}

/// Error body returned by the relay
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
