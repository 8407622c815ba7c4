//! Domain events - notifications emitted when like state changes

mod like_change;

pub use like_change::{LikeChange, LikeChangeKind};
