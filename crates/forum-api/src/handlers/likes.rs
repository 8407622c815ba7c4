//! Like handlers
//!
//! The actor is identified by `user_id` or `guest_session_id` in the query
//! string; exactly one must be present.

use axum::{extract::State, Json};
use forum_sync::dto::{ActorQuery, LikeCountResponse, LikeStatusResponse, LikeSummaryResponse};
use forum_sync::LikeService;

use crate::extractors::{PostIdPath, ValidatedQuery};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Like count and the actor's like status
///
/// GET /posts/{post_id}/likes
pub async fn get_summary(
    State(state): State<AppState>,
    PostIdPath(post_id): PostIdPath,
    ValidatedQuery(query): ValidatedQuery<ActorQuery>,
) -> ApiResult<Json<LikeSummaryResponse>> {
    let actor = query.into_actor()?;
    let service = LikeService::new(state.service_context());
    let summary = service.get_summary(&post_id, &actor).await?;
    Ok(Json(summary))
}

/// Like count only
///
/// GET /posts/{post_id}/likes/count
pub async fn get_count(
    State(state): State<AppState>,
    PostIdPath(post_id): PostIdPath,
) -> ApiResult<Json<LikeCountResponse>> {
    let service = LikeService::new(state.service_context());
    Ok(Json(service.get_count(&post_id).await?))
}

/// Whether the actor has liked the post
///
/// GET /posts/{post_id}/likes/@me
pub async fn get_status(
    State(state): State<AppState>,
    PostIdPath(post_id): PostIdPath,
    ValidatedQuery(query): ValidatedQuery<ActorQuery>,
) -> ApiResult<Json<LikeStatusResponse>> {
    let actor = query.into_actor()?;
    let service = LikeService::new(state.service_context());
    Ok(Json(service.get_status(&post_id, &actor).await?))
}

/// Like the post
///
/// PUT /posts/{post_id}/likes/@me
pub async fn add_like(
    State(state): State<AppState>,
    PostIdPath(post_id): PostIdPath,
    ValidatedQuery(query): ValidatedQuery<ActorQuery>,
) -> ApiResult<NoContent> {
    let actor = query.into_actor()?;
    let service = LikeService::new(state.service_context());
    service.add_like(&post_id, &actor).await?;
    Ok(NoContent)
}

/// Remove the actor's like
///
/// DELETE /posts/{post_id}/likes/@me
pub async fn remove_like(
    State(state): State<AppState>,
    PostIdPath(post_id): PostIdPath,
    ValidatedQuery(query): ValidatedQuery<ActorQuery>,
) -> ApiResult<NoContent> {
    let actor = query.into_actor()?;
    let service = LikeService::new(state.service_context());
    service.remove_like(&post_id, &actor).await?;
    Ok(NoContent)
}
