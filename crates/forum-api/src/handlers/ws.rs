//! Like change WebSocket
//!
//! One socket per post. The server only pushes; client frames other than
//! close are ignored.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use forum_core::LikeSubscription;
use forum_sync::dto::LikeChangeMessage;
use forum_sync::LikeService;
use futures_util::{SinkExt, StreamExt};

use crate::extractors::PostIdPath;
use crate::response::ApiResult;
use crate::state::AppState;

/// Stream like changes of one post
///
/// GET /posts/{post_id}/likes/ws
pub async fn like_stream(
    State(state): State<AppState>,
    PostIdPath(post_id): PostIdPath,
    ws: WebSocketUpgrade,
) -> ApiResult<impl IntoResponse> {
    // Subscribe before upgrading so a dead feed is reported as an HTTP error
    let subscription = LikeService::new(state.service_context()).subscribe(&post_id)?;
    Ok(ws.on_upgrade(move |socket| forward_changes(socket, subscription)))
}

async fn forward_changes(socket: WebSocket, mut subscription: LikeSubscription) {
    let post_id = subscription.post_id().clone();
    let (mut ws_sink, mut ws_stream) = socket.split();
    tracing::info!(post_id = %post_id, "Like stream opened");

    loop {
        tokio::select! {
            change = subscription.next() => {
                let Some(change) = change else {
                    tracing::warn!(post_id = %post_id, "Like feed closed");
                    break;
                };
                let json = match serde_json::to_string(&LikeChangeMessage::from(&change)) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(post_id = %post_id, error = %e, "Failed to encode like change");
                        continue;
                    }
                };
                if ws_sink.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            incoming = ws_stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(post_id = %post_id, error = %e, "Like stream error");
                    break;
                }
            }
        }
    }

    let _ = ws_sink.close().await;
    subscription.unsubscribe();
    tracing::info!(post_id = %post_id, "Like stream closed");
}
