//! Ports implemented by the infrastructure crates

mod feed;
mod repositories;

pub use feed::{LikeChangeFeed, LikeEvents, LikeSubscription, SubscriptionGuard};
pub use repositories::{DeleteOutcome, InsertOutcome, LikeRepository, RepoResult};
