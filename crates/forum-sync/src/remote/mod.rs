//! Client side of the like relay
//!
//! Implements the like ports over the relay's HTTP API and WebSocket, so a
//! [`ServiceContext`](crate::services::ServiceContext) can be built for a
//! process that has no database access.

mod http;
mod ws;

pub use http::HttpLikeRepository;
pub use ws::WsLikeFeed;

use reqwest::Url;

use forum_core::{DomainError, PostId};

/// `{base}/api/v1/posts/{post_id}/likes/{tail..}` with the post id escaped
pub(crate) fn likes_url(base: &Url, post_id: &PostId, tail: &[&str]) -> Result<Url, DomainError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| DomainError::Internal(format!("relay url cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(["api", "v1", "posts", post_id.as_str(), "likes"])
        .extend(tail);
    Ok(url)
}

pub(crate) fn parse_relay_url(raw: &str) -> Result<Url, DomainError> {
    Url::parse(raw).map_err(|e| DomainError::Internal(format!("invalid relay url {raw}: {e}")))
}
