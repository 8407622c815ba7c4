//! WebSocket like change feed

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Url;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use forum_common::SyncConfig;
use forum_core::traits::RepoResult;
use forum_core::{DomainError, LikeChange, LikeChangeFeed, LikeSubscription, PostId};

use super::{likes_url, parse_relay_url};
use crate::dto::LikeChangeMessage;

const SUBSCRIPTION_BUFFER: usize = 16;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// [`LikeChangeFeed`] reading the relay's per-post WebSocket.
///
/// Each subscription owns one connection task. The task reconnects until
/// the subscription is closed, and reports a reconnect as a `Resync`
/// change since notifications may have been missed in between.
#[derive(Debug, Clone)]
pub struct WsLikeFeed {
    base_url: Url,
}

impl WsLikeFeed {
    pub fn new(base_url: &str) -> RepoResult<Self> {
        Ok(Self {
            base_url: parse_relay_url(base_url)?,
        })
    }

    pub fn from_config(config: &SyncConfig) -> RepoResult<Self> {
        let relay_url = config
            .relay_url
            .as_deref()
            .ok_or_else(|| DomainError::Internal("relay url is not configured".to_string()))?;
        Self::new(relay_url)
    }

    /// WebSocket endpoint of a post's change stream
    pub fn stream_url(&self, post_id: &PostId) -> RepoResult<Url> {
        let mut url = likes_url(&self.base_url, post_id, &["ws"])?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|()| DomainError::Internal(format!("cannot use {url} as a websocket url")))?;
        Ok(url)
    }
}

impl LikeChangeFeed for WsLikeFeed {
    fn subscribe(&self, post_id: &PostId) -> Result<LikeSubscription, DomainError> {
        let url = self.stream_url(post_id)?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let task = tokio::spawn(stream_changes(url, post_id.clone(), tx));

        Ok(LikeSubscription::new(post_id.clone(), rx, move || task.abort()))
    }
}

async fn stream_changes(url: Url, post_id: PostId, tx: mpsc::Sender<LikeChange>) {
    let mut reconnecting = false;

    loop {
        match connect_async(url.as_str()).await {
            Ok((mut stream, _)) => {
                debug!(post_id = %post_id, "Like stream connected");
                if reconnecting && !forward(&tx, LikeChange::resync(post_id.clone())) {
                    return;
                }
                reconnecting = true;

                while let Some(message) = stream.next().await {
                    let text = match message {
                        Ok(Message::Text(text)) => text,
                        Ok(Message::Close(_)) => break,
                        Ok(_) => continue,
                        Err(e) => {
                            warn!(post_id = %post_id, error = %e, "Like stream error");
                            break;
                        }
                    };

                    match serde_json::from_str::<LikeChangeMessage>(&text) {
                        Ok(message) if message.post_id == post_id => {
                            if !forward(&tx, message.into()) {
                                return;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => warn!(post_id = %post_id, error = %e, "Malformed like change"),
                    }
                }
            }
            Err(e) => warn!(post_id = %post_id, error = %e, "Like stream connect failed"),
        }

        if tx.is_closed() {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Queue a change; false once the subscriber is gone.
/// A full queue already holds a pending reload, so the change is dropped.
fn forward(tx: &mpsc::Sender<LikeChange>, change: LikeChange) -> bool {
    match tx.try_send(change) {
        Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => true,
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}
