//! Route definitions
//!
//! Like routes are mounted under /api/v1; health routes sit at the root.

use axum::{routing::get, Router};

use crate::handlers::{health, likes, ws};
use crate::state::AppState;

/// Create the API router (excluding health)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new().merge(like_routes())
}

/// Like routes
fn like_routes() -> Router<AppState> {
    Router::new()
        .route("/posts/:post_id/likes", get(likes::get_summary))
        .route("/posts/:post_id/likes/count", get(likes::get_count))
        .route(
            "/posts/:post_id/likes/@me",
            get(likes::get_status)
                .put(likes::add_like)
                .delete(likes::remove_like),
        )
        .route("/posts/:post_id/likes/ws", get(ws::like_stream))
}
