//! Application state
//!
//! Holds the shared state for the Axum application: the like service
//! context, configuration, and the connections health checks probe.

use std::sync::Arc;

use forum_cache::RedisPool;
use forum_common::AppConfig;
use forum_db::PgPool;
use forum_sync::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    pool: PgPool,
    redis: Option<Arc<RedisPool>>,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        pool: PgPool,
        redis: Option<Arc<RedisPool>>,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            pool,
            redis,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Redis pool, when `REDIS_URL` is configured
    pub fn redis(&self) -> Option<&RedisPool> {
        self.redis.as_deref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("config", &"AppConfig")
            .field("redis", &self.redis.is_some())
            .finish()
    }
}
