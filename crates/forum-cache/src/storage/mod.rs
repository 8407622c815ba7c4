//! Client storage capability
//!
//! A small key/value store with browser `localStorage` semantics: string
//! values, a byte quota, and a change notification other holders of the
//! same storage (other tabs, other processes) can watch.

mod memory;
mod redis_store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use memory::MemoryStorage;
pub use redis_store::RedisStorage;

/// Error type for client storage operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage quota exceeded writing {key} ({bytes} bytes)")]
    QuotaExceeded { key: String, bytes: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Check if this is a quota error
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A write observed on the storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
}

/// Persistent string key/value storage shared by every consumer on a device
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Read a value; `None` when the key was never written
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, failing with `QuotaExceeded` when it does not fit
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Receive every subsequent write to this storage
    fn watch(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Capacity of the change notification channel
pub(crate) const EVENT_BUFFER: usize = 64;
