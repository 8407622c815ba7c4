//! # forum-sync
//!
//! Like synchronization for forum posts.
//!
//! - [`services`]: relay-side use cases over the like ports
//! - [`synchronizer`]: optimistic like toggling with rollback for one consumer
//! - [`realtime`]: the change subscription that keeps a consumer fresh
//! - [`unified`]: the display count, folding in pending guest likes
//! - [`consumer`]: mount/unmount lifecycle tying the above together
//! - [`remote`]: like ports over the relay's HTTP API and WebSocket

pub mod consumer;
pub mod dto;
pub mod error;
pub mod machine;
pub mod realtime;
pub mod remote;
pub mod services;
pub mod synchronizer;
pub mod unified;

#[cfg(test)]
mod testing;

pub use consumer::{LikeConsumer, Mounted};
pub use error::{SyncError, SyncResult};
pub use machine::{LikeEvent, LikeMachine, LikePhase, TransitionError};
pub use realtime::LikeWatcher;
pub use remote::{HttpLikeRepository, WsLikeFeed};
pub use services::{LikeService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
pub use synchronizer::{LikeSync, ToggleOutcome};
pub use unified::UnifiedLikeCount;
