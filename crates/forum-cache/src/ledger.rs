//! Guest like delta ledger
//!
//! Guests see their own like reflected before the backend has confirmed it.
//! The ledger keeps per-post increments in client storage as a JSON object
//! (`{"post-1": 1}`) so every tab on the device shows the same adjustment.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, Mutex as AsyncMutex};

use forum_core::PostId;

use crate::storage::{ClientStorage, StorageEvent};

/// Storage key of the guest delta ledger
pub const GUEST_LIKE_DELTAS_KEY: &str = "forum.guest_like_deltas";

type Deltas = HashMap<String, i64>;

/// Like count cache merging server counts with local guest deltas
pub struct LikeCountCache {
    storage: Arc<dyn ClientStorage>,
    /// Deltas that could not be persisted; served instead of storage
    overlay: Mutex<Option<Deltas>>,
    /// Serializes read-modify-write cycles from this process
    write_lock: AsyncMutex<()>,
    local_changes: broadcast::Sender<()>,
}

impl LikeCountCache {
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        let (local_changes, _) = broadcast::channel(16);
        Self {
            storage,
            overlay: Mutex::new(None),
            write_lock: AsyncMutex::new(()),
            local_changes,
        }
    }

    /// Server count adjusted by this device's pending guest delta
    pub async fn display_count(&self, post_id: &PostId, server_count: u64) -> u64 {
        server_count.saturating_add_signed(self.delta(post_id).await)
    }

    /// Pending guest delta for a post; 0 when absent or unreadable
    pub async fn delta(&self, post_id: &PostId) -> i64 {
        self.load().await.get(post_id.as_str()).copied().unwrap_or(0)
    }

    /// Add `delta` to the post's entry, dropping the entry when it reaches zero.
    ///
    /// Returns the new delta. Persistence failures are logged and the change
    /// is kept in memory.
    pub async fn record(&self, post_id: &PostId, delta: i64) -> i64 {
        let _guard = self.write_lock.lock().await;

        let mut deltas = self.load().await;
        let entry = deltas.entry(post_id.as_str().to_string()).or_insert(0);
        *entry = entry.saturating_add(delta);
        let updated = *entry;
        if updated == 0 {
            deltas.remove(post_id.as_str());
        }

        match serde_json::to_string(&deltas) {
            Ok(raw) => match self.storage.set_item(GUEST_LIKE_DELTAS_KEY, &raw).await {
                Ok(()) => {
                    *self.overlay.lock() = None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, post_id = %post_id, "Guest like ledger not persisted, keeping it in memory");
                    *self.overlay.lock() = Some(deltas);
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode guest like ledger");
                *self.overlay.lock() = Some(deltas);
            }
        }

        let _ = self.local_changes.send(());
        tracing::debug!(post_id = %post_id, delta, updated, "Guest like delta recorded");
        updated
    }

    /// Watch for ledger changes from this process or any other holder of the storage
    pub fn watch(&self) -> LedgerWatch {
        LedgerWatch {
            storage: self.storage.watch(),
            local: self.local_changes.subscribe(),
        }
    }

    async fn load(&self) -> Deltas {
        let overlay = self.overlay.lock().clone();
        if let Some(overlay) = overlay {
            return overlay;
        }

        match self.storage.get_item(GUEST_LIKE_DELTAS_KEY).await {
            Ok(Some(raw)) => parse_deltas(&raw),
            Ok(None) => Deltas::new(),
            Err(e) => {
                tracing::debug!(error = %e, "Guest like ledger unreadable, assuming no deltas");
                Deltas::new()
            }
        }
    }
}

/// Decode the stored ledger, skipping anything that is not a `{string: integer}` pair
fn parse_deltas(raw: &str) -> Deltas {
    match serde_json::from_str::<Map<String, Value>>(raw) {
        Ok(map) => map
            .into_iter()
            .filter_map(|(post, value)| value.as_i64().map(|delta| (post, delta)))
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed guest like ledger ignored");
            Deltas::new()
        }
    }
}

/// Receiver of ledger change notifications
pub struct LedgerWatch {
    storage: broadcast::Receiver<StorageEvent>,
    local: broadcast::Receiver<()>,
}

impl LedgerWatch {
    /// Wait until the ledger may have changed. Returns `false` once both
    /// sources are closed.
    pub async fn changed(&mut self) -> bool {
        let mut storage_open = true;
        let mut local_open = true;

        while storage_open || local_open {
            tokio::select! {
                event = self.storage.recv(), if storage_open => match event {
                    Ok(event) if event.key == GUEST_LIKE_DELTAS_KEY => return true,
                    Ok(_) => {}
                    // Missed events may have touched the ledger
                    Err(broadcast::error::RecvError::Lagged(_)) => return true,
                    Err(broadcast::error::RecvError::Closed) => storage_open = false,
                },
                change = self.local.recv(), if local_open => match change {
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => return true,
                    Err(broadcast::error::RecvError::Closed) => local_open = false,
                },
            }
        }
        false
    }
}
