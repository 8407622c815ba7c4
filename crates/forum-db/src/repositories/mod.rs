//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in forum-core.

mod error;
mod like;

pub use error::{is_unique_violation, map_db_error};
pub use like::PgLikeRepository;
