//! Relay API integration tests
//!
//! These tests require a running PostgreSQL instance and `DATABASE_URL`;
//! they are skipped otherwise.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use std::time::Duration;

use futures_util::StreamExt;
use forum_core::LikeChangeKind;
use forum_sync::dto::{LikeChangeMessage, LikeCountResponse, LikeStatusResponse, LikeSummaryResponse};
use integration_tests::{
    actor_query, assert_json, assert_status, check_test_env, unique_guest, unique_post_id,
    unique_user, ErrorBody, TestServer,
};
use reqwest::StatusCode;
use tokio_tungstenite::tungstenite::Message;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Like Tests
// ============================================================================

#[tokio::test]
async fn test_like_and_unlike() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let post_id = unique_post_id();
    let user = unique_user();
    let me = format!("{}?{}", TestServer::likes_path(&post_id, "/@me"), actor_query(&user));
    let summary = format!("{}?{}", TestServer::likes_path(&post_id, ""), actor_query(&user));

    let response = server.put(&me).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let body: LikeSummaryResponse = assert_json(server.get(&summary).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(body.post_id, post_id.as_str());
    assert_eq!(body.count, 1);
    assert!(body.liked);

    let response = server.delete(&me).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let body: LikeSummaryResponse = assert_json(server.get(&summary).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(body.count, 0);
    assert!(!body.liked);
}

#[tokio::test]
async fn test_duplicate_like_conflicts() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let post_id = unique_post_id();
    let guest = unique_guest();
    let me = format!("{}?{}", TestServer::likes_path(&post_id, "/@me"), actor_query(&guest));

    server.put(&me).await.unwrap();
    let error: ErrorBody = assert_json(server.put(&me).await.unwrap(), StatusCode::CONFLICT)
        .await
        .unwrap();
    assert_eq!(error.error.code, "LIKE_ALREADY_EXISTS");

    let count: LikeCountResponse = assert_json(
        server
            .get(&TestServer::likes_path(&post_id, "/count"))
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(count.count, 1);
}

#[tokio::test]
async fn test_unlike_without_like_is_not_found() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let post_id = unique_post_id();
    let me = format!(
        "{}?{}",
        TestServer::likes_path(&post_id, "/@me"),
        actor_query(&unique_user())
    );

    let error: ErrorBody = assert_json(server.delete(&me).await.unwrap(), StatusCode::NOT_FOUND)
        .await
        .unwrap();
    assert_eq!(error.error.code, "LIKE_NOT_FOUND");
}

#[tokio::test]
async fn test_user_and_guest_likes_are_counted_separately() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let post_id = unique_post_id();
    let user = unique_user();
    let guest = unique_guest();

    for actor in [&user, &guest] {
        let me = format!("{}?{}", TestServer::likes_path(&post_id, "/@me"), actor_query(actor));
        assert_status(server.put(&me).await.unwrap(), StatusCode::NO_CONTENT)
            .await
            .unwrap();
    }

    let status: LikeStatusResponse = assert_json(
        server
            .get(&format!(
                "{}?{}",
                TestServer::likes_path(&post_id, "/@me"),
                actor_query(&unique_guest())
            ))
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert!(!status.liked);

    let count: LikeCountResponse = assert_json(
        server
            .get(&TestServer::likes_path(&post_id, "/count"))
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(count.count, 2);
}

#[tokio::test]
async fn test_actor_validation() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let post_id = unique_post_id();

    let error: ErrorBody = assert_json(
        server
            .put(&TestServer::likes_path(&post_id, "/@me"))
            .await
            .unwrap(),
        StatusCode::BAD_REQUEST,
    )
    .await
    .unwrap();
    assert_eq!(error.error.code, "VALIDATION_ERROR");
    assert!(error.error.message.contains("required"));
}

// ============================================================================
// WebSocket Tests
// ============================================================================

#[tokio::test]
async fn test_websocket_pushes_changes() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let post_id = unique_post_id();
    let ws_url = format!("ws://{}{}", server.addr, TestServer::likes_path(&post_id, "/ws"));

    let (mut socket, _) = tokio_tungstenite::connect_async(ws_url.as_str())
        .await
        .expect("WebSocket connect failed");

    let me = format!(
        "{}?{}",
        TestServer::likes_path(&post_id, "/@me"),
        actor_query(&unique_user())
    );
    server.put(&me).await.unwrap();

    let message = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return text,
                Some(Ok(_)) => continue,
                other => panic!("unexpected websocket frame: {other:?}"),
            }
        }
    })
    .await
    .expect("no like change pushed");

    let change: LikeChangeMessage = serde_json::from_str(&message).unwrap();
    assert_eq!(change.event_type, "LIKE_CHANGE");
    assert_eq!(change.post_id, post_id);
    assert_eq!(change.kind, LikeChangeKind::Inserted);
}
