//! Postgres LISTEN/NOTIFY change feed

use std::time::Duration;

use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use forum_core::{DomainError, LikeChangeFeed, LikeSubscription, PostId};

use crate::models::LikeNotification;

use super::registry::FeedRegistry;

/// Channel the `post_likes` trigger notifies on
pub const LIKE_CHANNEL: &str = "post_likes";

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Like change feed backed by a single `PgListener`.
///
/// One background task receives every notification and fans it out to the
/// subscribers of the affected post. Dropping the feed stops the task.
pub struct PgLikeFeed {
    registry: FeedRegistry,
    task: JoinHandle<()>,
}

impl PgLikeFeed {
    /// Connect a listener from the pool and start dispatching notifications
    pub async fn start(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(LIKE_CHANNEL).await?;

        tracing::info!(channel = LIKE_CHANNEL, "Like change feed listening");

        let registry = FeedRegistry::new();
        let task = tokio::spawn(listen_loop(listener, registry.clone()));

        Ok(Self { registry, task })
    }

    /// Subscriber registry, for diagnostics
    pub fn registry(&self) -> &FeedRegistry {
        &self.registry
    }
}

impl LikeChangeFeed for PgLikeFeed {
    fn subscribe(&self, post_id: &PostId) -> Result<LikeSubscription, DomainError> {
        if self.task.is_finished() {
            return Err(DomainError::Unavailable("like change feed stopped".to_string()));
        }
        Ok(self.registry.register(post_id))
    }
}

impl Drop for PgLikeFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn listen_loop(mut listener: PgListener, registry: FeedRegistry) {
    let mut gap = FeedGap::default();
    loop {
        if gap.is_open() {
            if let Err(e) = reconnect(&mut listener).await {
                tracing::error!(error = %e, "Like change feed reconnect failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
            gap.close(&registry);
        }

        match listener.try_recv().await {
            Ok(Some(notification)) => {
                handle_payload(&registry, notification.payload());
            }
            Ok(None) => {
                tracing::warn!("Like change feed connection lost");
                gap.open();
            }
            Err(e) => {
                tracing::error!(error = %e, "Like change feed error, reconnecting");
                gap.open();
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

/// Any statement on the listener re-establishes its connection and
/// re-issues `LISTEN` for every channel.
async fn reconnect(listener: &mut PgListener) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(listener).await?;
    Ok(())
}

/// Window in which notifications may have been missed
#[derive(Debug, Default)]
struct FeedGap {
    open: bool,
}

impl FeedGap {
    fn open(&mut self) {
        self.open = true;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    /// Called once the listener is connected again. Subscribers are told to
    /// reload only now, so their reload sees everything the gap swallowed.
    fn close(&mut self, registry: &FeedRegistry) -> bool {
        if !std::mem::take(&mut self.open) {
            return false;
        }
        tracing::info!("Like change feed reconnected, resyncing subscribers");
        registry.resync_all();
        true
    }
}

fn handle_payload(registry: &FeedRegistry, payload: &str) {
    let change = match serde_json::from_str::<LikeNotification>(payload) {
        Ok(notification) => notification.into_change(),
        Err(e) => {
            tracing::warn!(error = %e, payload, "Malformed like notification");
            return;
        }
    };

    match change {
        Some(change) => {
            let delivered = registry.dispatch(&change);
            tracing::trace!(post_id = %change.post_id, delivered, "Like change dispatched");
        }
        None => tracing::debug!(payload, "Ignoring like notification"),
    }
}
