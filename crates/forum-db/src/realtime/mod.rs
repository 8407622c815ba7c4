//! Realtime like change feed over Postgres LISTEN/NOTIFY

mod listener;
mod registry;

pub use listener::{PgLikeFeed, LIKE_CHANNEL};
pub use registry::FeedRegistry;
