//! # forum-core
//!
//! Domain layer for forum post likes: actors, like records, the per-consumer
//! view state, realtime change notifications, and the ports the rest of the
//! workspace implements. Nothing here knows about Postgres, Redis or HTTP.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{LikeRecord, LikeViewState};
pub use error::DomainError;
pub use events::{LikeChange, LikeChangeKind};
pub use traits::{
    DeleteOutcome, InsertOutcome, LikeChangeFeed, LikeEvents, LikeRepository, LikeSubscription,
    RepoResult, SubscriptionGuard,
};
pub use value_objects::{Actor, PostId, PostIdParseError};
