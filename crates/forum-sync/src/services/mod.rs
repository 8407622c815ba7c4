//! Relay services
//!
//! Service layer used by the relay's HTTP and WebSocket handlers.

pub mod context;
pub mod error;
pub mod like;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use like::LikeService;
