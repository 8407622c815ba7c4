//! Redis-backed client storage
//!
//! Lets several processes on one device share guest identity and the guest
//! like ledger. Keys live under `storage:{namespace}:` and every write is
//! published on `storage:{namespace}` so the other processes see it.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use forum_common::StorageConfig;

use crate::pool::{RedisPool, RedisResult};

use super::{ClientStorage, StorageError, StorageEvent, StorageResult, EVENT_BUFFER};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Client storage shared through Redis
pub struct RedisStorage {
    pool: RedisPool,
    namespace: String,
    max_value_bytes: usize,
    events: broadcast::Sender<StorageEvent>,
    listener: JoinHandle<()>,
}

impl RedisStorage {
    /// Create the storage and start listening for writes from other processes
    pub fn new(pool: RedisPool, config: &StorageConfig) -> RedisResult<Self> {
        let client = pool.client()?;
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let channel = channel_name(&config.namespace);

        let listener = tokio::spawn(listener_loop(client, channel, events.clone()));

        Ok(Self {
            pool,
            namespace: config.namespace.clone(),
            max_value_bytes: config.max_value_bytes,
            events,
            listener,
        })
    }

    fn item_key(&self, key: &str) -> String {
        item_key(&self.namespace, key)
    }
}

impl Drop for RedisStorage {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

#[async_trait]
impl ClientStorage for RedisStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        conn.get(self.item_key(key)).await.map_err(map_redis_error(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        if value.len() > self.max_value_bytes {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                bytes: value.len(),
            });
        }

        let payload = serde_json::to_string(&StorageEvent {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        })?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        redis::pipe()
            .set(self.item_key(key), value)
            .ignore()
            .publish(channel_name(&self.namespace), payload)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(map_redis_error(key))
    }

    fn watch(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

fn item_key(namespace: &str, key: &str) -> String {
    format!("storage:{namespace}:{key}")
}

fn channel_name(namespace: &str) -> String {
    format!("storage:{namespace}")
}

/// Redis reports a full `maxmemory` as `OOM`; treat it like a browser quota error
fn map_redis_error(key: &str) -> impl FnOnce(redis::RedisError) -> StorageError + '_ {
    move |e| {
        if e.code() == Some("OOM") {
            StorageError::QuotaExceeded {
                key: key.to_string(),
                bytes: 0,
            }
        } else {
            StorageError::Unavailable(e.to_string())
        }
    }
}

async fn listener_loop(
    client: redis::Client,
    channel: String,
    events: broadcast::Sender<StorageEvent>,
) {
    loop {
        if let Err(e) = run_listener(&client, &channel, &events).await {
            tracing::error!(error = %e, channel = %channel, "Storage subscriber error, reconnecting...");
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn run_listener(
    client: &redis::Client,
    channel: &str,
    events: &broadcast::Sender<StorageEvent>,
) -> redis::RedisResult<()> {
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(channel).await?;

    tracing::debug!(channel = %channel, "Storage subscriber connected");

    let mut stream = pubsub.on_message();
    while let Some(msg) = stream.next().await {
        let payload: String = msg.get_payload().unwrap_or_default();
        match serde_json::from_str::<StorageEvent>(&payload) {
            Ok(event) => {
                // No receivers is fine
                let _ = events.send(event);
            }
            Err(e) => tracing::warn!(error = %e, "Malformed storage event"),
        }
    }

    tracing::warn!(channel = %channel, "Storage subscriber stream ended");
    Ok(())
}
