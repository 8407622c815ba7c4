//! Service context - dependency container for services
//!
//! Holds the like store, the change feed, and the client-side pieces the
//! synchronizer needs. The relay server and the client share this type; the
//! server simply never sets a ledger.

use std::sync::Arc;

use forum_cache::LikeCountCache;
use forum_common::SyncConfig;
use forum_core::traits::{LikeChangeFeed, LikeRepository};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Ports
    like_repo: Arc<dyn LikeRepository>,
    like_feed: Arc<dyn LikeChangeFeed>,

    // Client side
    ledger: Option<Arc<LikeCountCache>>,
    sync_config: SyncConfig,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(
        like_repo: Arc<dyn LikeRepository>,
        like_feed: Arc<dyn LikeChangeFeed>,
        ledger: Option<Arc<LikeCountCache>>,
        sync_config: SyncConfig,
    ) -> Self {
        Self {
            like_repo,
            like_feed,
            ledger,
            sync_config,
        }
    }

    // === Ports ===

    /// Get the like repository
    pub fn like_repo(&self) -> &Arc<dyn LikeRepository> {
        &self.like_repo
    }

    /// Get the like change feed
    pub fn like_feed(&self) -> &Arc<dyn LikeChangeFeed> {
        &self.like_feed
    }

    // === Client Side ===

    /// Get the guest like ledger, if this context runs on a client
    pub fn ledger(&self) -> Option<&Arc<LikeCountCache>> {
        self.ledger.as_ref()
    }

    /// Get the synchronizer settings
    pub fn sync_config(&self) -> &SyncConfig {
        &self.sync_config
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("like_repo", &"dyn LikeRepository")
            .field("like_feed", &"dyn LikeChangeFeed")
            .field("ledger", &self.ledger.is_some())
            .field("sync_config", &self.sync_config)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    like_repo: Option<Arc<dyn LikeRepository>>,
    like_feed: Option<Arc<dyn LikeChangeFeed>>,
    ledger: Option<Arc<LikeCountCache>>,
    sync_config: Option<SyncConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn like_repo(mut self, repo: Arc<dyn LikeRepository>) -> Self {
        self.like_repo = Some(repo);
        self
    }

    pub fn like_feed(mut self, feed: Arc<dyn LikeChangeFeed>) -> Self {
        self.like_feed = Some(feed);
        self
    }

    pub fn ledger(mut self, ledger: Arc<LikeCountCache>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn sync_config(mut self, config: SyncConfig) -> Self {
        self.sync_config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns an error if the repository or the feed is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.like_repo
                .ok_or_else(|| super::error::ServiceError::validation("like_repo is required"))?,
            self.like_feed
                .ok_or_else(|| super::error::ServiceError::validation("like_feed is required"))?,
            self.ledger,
            self.sync_config.unwrap_or_default(),
        ))
    }
}
