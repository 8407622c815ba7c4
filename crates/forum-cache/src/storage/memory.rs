//! In-process client storage

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use forum_common::StorageConfig;

use super::{ClientStorage, StorageError, StorageEvent, StorageResult, EVENT_BUFFER};

/// Client storage held in memory with a total byte quota.
///
/// Share one instance through an `Arc` to model several tabs of the same
/// browser profile.
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: usize,
    available: AtomicBool,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    /// Create a storage holding at most `quota_bytes` of keys and values
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            items: Mutex::new(HashMap::new()),
            quota_bytes,
            available: AtomicBool::new(true),
            events,
        }
    }

    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::with_quota(config.max_value_bytes)
    }

    /// Simulate storage being switched off, as in some private browsing modes
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Drop every stored item
    pub fn clear(&self) {
        self.items.lock().clear();
    }

    /// Bytes currently used by keys and values
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.items.lock().iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("storage disabled".to_string()))
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.check_available()?;
        Ok(self.items.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_available()?;
        {
            let mut items = self.items.lock();
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            if others + needed > self.quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    bytes: needed,
                });
            }
            items.insert(key.to_string(), value.to_string());
        }

        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
