//! # forum-db
//!
//! PostgreSQL implementation of the like ports defined in `forum-core`.
//!
//! ## Overview
//!
//! - Connection pool management and the embedded `post_likes` migration
//! - Database models with SQLx `FromRow` derives
//! - `PgLikeRepository`: count, has-liked, insert and delete
//! - `PgLikeFeed`: LISTEN/NOTIFY change feed fanned out per post
//!
//! ## Usage
//!
//! ```rust,ignore
//! use forum_db::{create_pool, run_migrations, PgLikeFeed, PgLikeRepository, PoolConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::default()).await?;
//!     run_migrations(&pool).await?;
//!
//!     let likes = PgLikeRepository::new(pool.clone());
//!     let feed = PgLikeFeed::start(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod realtime;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use realtime::{FeedRegistry, PgLikeFeed, LIKE_CHANNEL};
pub use repositories::PgLikeRepository;
