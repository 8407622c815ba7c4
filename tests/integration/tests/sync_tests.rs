//! Synchronizer integration tests over the relay
//!
//! Mounted consumers talk to a spawned relay through `HttpLikeRepository`
//! and `WsLikeFeed`. Requires `DATABASE_URL`; the shared-storage test also
//! requires `REDIS_URL`.
//!
//! Run with: cargo test -p integration-tests --test sync_tests

use std::sync::Arc;
use std::time::Duration;

use forum_cache::{GuestIdentityProvider, LikeCountCache, RedisPool, RedisStorage};
use forum_common::{RedisConfig, StorageConfig};
use forum_core::LikeViewState;
use forum_sync::{LikeConsumer, LikePhase, ToggleOutcome};
use integration_tests::{
    check_redis_env, check_test_env, eventually, redis_url, unique_post_id, unique_user,
    TestServer,
};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_toggle_round_trip() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ctx = server.remote_context(None).unwrap();
    let post_id = unique_post_id();

    let mounted = LikeConsumer::mount(&ctx, post_id, unique_user()).await.unwrap();
    assert_eq!(mounted.initial_load.unwrap(), LikeViewState::confirmed(0, false));
    let consumer = mounted.consumer;

    assert_eq!(consumer.toggle().await.unwrap(), ToggleOutcome::Applied { liked: true });
    assert_eq!(consumer.view(), LikeViewState::confirmed(1, true));

    assert_eq!(consumer.toggle().await.unwrap(), ToggleOutcome::Applied { liked: false });
    assert_eq!(consumer.view(), LikeViewState::confirmed(0, false));
    assert_eq!(consumer.phase(), LikePhase::Ready);
}

#[tokio::test]
async fn test_other_consumer_sees_change() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ctx = server.remote_context(None).unwrap();
    let post_id = unique_post_id();

    let watching = LikeConsumer::mount(&ctx, post_id.clone(), unique_user())
        .await
        .unwrap()
        .consumer;
    let acting = LikeConsumer::mount(&ctx, post_id, unique_user())
        .await
        .unwrap()
        .consumer;

    acting.toggle().await.unwrap();

    assert!(eventually(WAIT, || watching.view().count == 1).await);
    assert!(!watching.view().is_liked_by_actor);
}

#[tokio::test]
async fn test_stale_duplicate_is_reconciled() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let ctx = server.remote_context(None).unwrap();
    let post_id = unique_post_id();
    let user = unique_user();

    // Two tabs of the same user, both showing "not liked"
    let first = LikeConsumer::mount(&ctx, post_id.clone(), user.clone())
        .await
        .unwrap()
        .consumer;
    let second = LikeConsumer::mount(&ctx, post_id, user).await.unwrap().consumer;

    first.toggle().await.unwrap();
    // The second tab may already have reloaded; either way it ends up liked
    let outcome = second.toggle().await.unwrap();
    if outcome == (ToggleOutcome::Applied { liked: false }) {
        second.toggle().await.unwrap();
    }

    assert!(eventually(WAIT, || second.view() == LikeViewState::confirmed(1, true)).await);
}

#[tokio::test]
async fn test_guest_ledger_shared_across_tabs() {
    if !check_redis_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let redis_config = RedisConfig {
        url: redis_url().unwrap(),
        max_connections: 4,
    };
    let storage_config = StorageConfig {
        namespace: format!("it-{}", uuid::Uuid::new_v4().simple()),
        ..StorageConfig::default()
    };

    // Two tabs of one device share the namespace
    let tab = || {
        let pool = RedisPool::from_config(&redis_config).unwrap();
        Arc::new(RedisStorage::new(pool, &storage_config).unwrap())
    };
    let storage_a = tab();
    let storage_b = tab();
    // Let both change listeners subscribe before anything is written
    tokio::time::sleep(Duration::from_millis(300)).await;

    let guest_a = GuestIdentityProvider::new(storage_a.clone());
    let guest_b = GuestIdentityProvider::new(storage_b.clone());
    let session = guest_a.get_or_create().await;
    assert_eq!(guest_b.get_or_create().await, session);

    let ledger_b = Arc::new(LikeCountCache::new(storage_b));
    let ctx_b = server.remote_context(Some(ledger_b)).unwrap();
    let post_id = unique_post_id();
    let consumer_b = LikeConsumer::mount(&ctx_b, post_id.clone(), guest_b.actor().await)
        .await
        .unwrap()
        .consumer;

    // Tab A's pending delta shows up in tab B's display count
    let ledger_a = LikeCountCache::new(storage_a);
    ledger_a.record(&post_id, 1).await;
    assert!(eventually(WAIT, || consumer_b.display_count() == 1).await);

    ledger_a.record(&post_id, -1).await;
    assert!(eventually(WAIT, || consumer_b.display_count() == 0).await);
}
