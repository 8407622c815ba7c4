//! Entity <-> model mappers

mod like;

pub use like::LikeInsert;
