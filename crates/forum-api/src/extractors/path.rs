//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use forum_core::PostId;

use crate::response::ApiError;

/// `:post_id` parsed into a [`PostId`]
#[derive(Debug, Clone)]
pub struct PostIdPath(pub PostId);

#[async_trait]
impl<S> FromRequestParts<S> for PostIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        let post_id = PostId::parse(raw).map_err(|e| ApiError::invalid_path(e.to_string()))?;
        Ok(PostIdPath(post_id))
    }
}
