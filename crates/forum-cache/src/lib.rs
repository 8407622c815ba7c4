//! # forum-cache
//!
//! Client-side storage for the like subsystem.
//!
//! ## Features
//!
//! - **Client Storage**: `ClientStorage` capability with an in-memory
//!   implementation and a Redis-backed one shared across processes
//! - **Guest Identity**: one persisted anonymous session id per device
//! - **Like Count Cache**: guest delta ledger merged into displayed counts
//! - **Connection Pool**: managed Redis connection pool with deadpool
//!
//! ## Example
//!
//! ```ignore
//! use forum_cache::{GuestIdentityProvider, LikeCountCache, MemoryStorage};
//!
//! let storage = Arc::new(MemoryStorage::default());
//! let guest = GuestIdentityProvider::new(storage.clone());
//! let ledger = LikeCountCache::new(storage);
//!
//! let actor = guest.actor().await;
//! let shown = ledger.display_count(&post_id, server_count).await;
//! ```

pub mod guest;
pub mod ledger;
pub mod pool;
pub mod storage;

pub use guest::{generate_session_id, GuestIdentityProvider, GUEST_SESSION_KEY};
pub use ledger::{LedgerWatch, LikeCountCache, GUEST_LIKE_DELTAS_KEY};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use storage::{
    ClientStorage, MemoryStorage, RedisStorage, StorageError, StorageEvent, StorageResult,
};
