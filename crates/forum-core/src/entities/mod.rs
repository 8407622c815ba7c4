//! Domain entities - core business objects

mod like;

pub use like::{LikeRecord, LikeViewState};
