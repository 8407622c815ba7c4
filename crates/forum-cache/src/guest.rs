//! Guest identity provider
//!
//! Issues one anonymous session id per device and keeps it in client storage
//! so the same guest is recognized across reloads.

use std::fmt::Write as _;
use std::sync::Arc;

use rand::Rng;
use tokio::sync::OnceCell;

use forum_core::value_objects::MAX_ACTOR_KEY_LEN;
use forum_core::Actor;

use crate::storage::ClientStorage;

/// Storage key of the persisted guest session id
pub const GUEST_SESSION_KEY: &str = "forum.guest_session_id";

const SESSION_PREFIX: &str = "guest_";

/// Resolves the device's guest session id
///
/// Storage is touched at most once for reading and once for writing per
/// provider; afterwards the id is served from memory.
pub struct GuestIdentityProvider {
    storage: Arc<dyn ClientStorage>,
    session_id: OnceCell<String>,
}

impl GuestIdentityProvider {
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            storage,
            session_id: OnceCell::new(),
        }
    }

    /// Return the guest session id, creating and persisting it on first use.
    ///
    /// Never fails: when storage cannot be read or written the id lives in
    /// memory for the rest of this provider's lifetime.
    pub async fn get_or_create(&self) -> String {
        self.session_id
            .get_or_init(|| self.resolve())
            .await
            .clone()
    }

    /// The current guest as an actor
    pub async fn actor(&self) -> Actor {
        Actor::guest(self.get_or_create().await)
    }

    /// Id already resolved by this provider, if any
    pub fn cached(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }

    async fn resolve(&self) -> String {
        match self.storage.get_item(GUEST_SESSION_KEY).await {
            Ok(Some(stored)) if is_valid_session_id(&stored) => return stored,
            Ok(Some(_)) => tracing::warn!("Discarding malformed guest session id"),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Guest session storage unreadable, using in-memory id");
                return generate_session_id();
            }
        }

        let session_id = generate_session_id();
        if let Err(e) = self.storage.set_item(GUEST_SESSION_KEY, &session_id).await {
            tracing::warn!(error = %e, "Failed to persist guest session id, using in-memory id");
        } else {
            tracing::debug!("Guest session id created");
        }
        session_id
    }
}

/// `guest_` followed by 128 random bits in lowercase hex
pub fn generate_session_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    let mut id = String::with_capacity(SESSION_PREFIX.len() + 32);
    id.push_str(SESSION_PREFIX);
    for b in bytes {
        let _ = write!(id, "{b:02x}");
    }
    id
}

fn is_valid_session_id(id: &str) -> bool {
    !id.trim().is_empty() && id.len() <= MAX_ACTOR_KEY_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageEvent, StorageResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::broadcast;

    /// Counts writes on top of a MemoryStorage
    struct CountingStorage {
        inner: MemoryStorage,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl ClientStorage for CountingStorage {
        async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set_item(key, value).await
        }

        fn watch(&self) -> broadcast::Receiver<StorageEvent> {
            self.inner.watch()
        }
    }

    #[test]
    fn test_session_id_format() {
        let id = generate_session_id();
        assert!(id.starts_with("guest_"));
        assert_eq!(id.len(), 38);
        assert!(id[6..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(id, generate_session_id());
    }

    #[tokio::test]
    async fn test_generated_once_and_persisted() {
        let storage = Arc::new(CountingStorage {
            inner: MemoryStorage::default(),
            writes: AtomicUsize::new(0),
        });
        let provider = GuestIdentityProvider::new(storage.clone());

        let first = provider.get_or_create().await;
        let second = provider.get_or_create().await;

        assert_eq!(first, second);
        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
        assert_eq!(
            storage.get_item(GUEST_SESSION_KEY).await.unwrap(),
            Some(first.clone())
        );

        // A new provider on the same storage reuses the id without writing
        let again = GuestIdentityProvider::new(storage.clone());
        assert_eq!(again.get_or_create().await, first);
        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_id() {
        let storage = Arc::new(MemoryStorage::default());
        let provider = Arc::new(GuestIdentityProvider::new(storage));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.get_or_create().await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_quota_failure_falls_back_to_memory() {
        let storage = Arc::new(MemoryStorage::with_quota(4));
        let provider = GuestIdentityProvider::new(storage.clone());

        let id = provider.get_or_create().await;
        assert!(id.starts_with("guest_"));
        assert_eq!(provider.get_or_create().await, id);
        assert_eq!(storage.get_item(GUEST_SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_storage_falls_back_to_memory() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set_available(false);
        let provider = GuestIdentityProvider::new(storage);

        let actor = provider.actor().await;
        assert!(actor.is_guest());
        assert_eq!(provider.cached(), Some(actor.key()));
    }

    #[tokio::test]
    async fn test_cleared_storage_issues_new_id() {
        let storage = Arc::new(MemoryStorage::default());
        let first = GuestIdentityProvider::new(storage.clone()).get_or_create().await;

        storage.clear();
        let second = GuestIdentityProvider::new(storage).get_or_create().await;
        assert_ne!(first, second);
    }
}
