//! Test helpers for integration tests
//!
//! Provides utilities for spawning a relay server, making HTTP requests,
//! and building a client-side service context against that server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use forum_api::{create_app, create_app_state};
use forum_cache::LikeCountCache;
use forum_common::{
    AppConfig, AppSettings, CorsConfig, DatabaseConfig, Environment, RedisConfig, ServerConfig,
    StorageConfig, SyncConfig,
};
use forum_core::PostId;
use forum_sync::{HttpLikeRepository, ServiceContext, ServiceContextBuilder, WsLikeFeed};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `/api/v1/posts/{post_id}/likes{suffix}`
    pub fn likes_path(post_id: &PostId, suffix: &str) -> String {
        format!("/api/v1/posts/{post_id}/likes{suffix}")
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    pub async fn put(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.put(&url).send().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.delete(&url).send().await?)
    }

    /// Client-side context talking to this server through the remote ports
    pub fn remote_context(&self, ledger: Option<Arc<LikeCountCache>>) -> Result<ServiceContext> {
        let sync_config = SyncConfig {
            relay_url: Some(self.base_url()),
            retry_base_ms: 10,
            retry_max_ms: 50,
            ..SyncConfig::default()
        };

        let mut builder = ServiceContextBuilder::new()
            .like_repo(Arc::new(HttpLikeRepository::from_config(&sync_config)?))
            .like_feed(Arc::new(WsLikeFeed::from_config(&sync_config)?))
            .sync_config(sync_config);
        if let Some(ledger) = ledger {
            builder = builder.ledger(ledger);
        }

        Ok(builder.build()?)
    }
}

/// Test configuration from the environment; the port is chosen at bind time
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    Ok(AppConfig {
        app: AppSettings {
            name: "forum-likes-test".to_string(),
            env: Environment::Development,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: std::env::var("DATABASE_URL")?,
            max_connections: 5,
            min_connections: 1,
        },
        redis: redis_url().map(|url| RedisConfig {
            url,
            max_connections: 4,
        }),
        cors: CorsConfig::default(),
        sync: SyncConfig::default(),
        storage: StorageConfig::default(),
    })
}

pub fn redis_url() -> Option<String> {
    std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty())
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    true
}

/// Like `check_test_env`, additionally requiring Redis
pub async fn check_redis_env() -> bool {
    if !check_test_env().await {
        return false;
    }

    if redis_url().is_none() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// Poll `check` until it holds or the timeout elapses
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
