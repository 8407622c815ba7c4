//! Data transfer objects for relay requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for relay inputs
//! - Response DTOs shared by the relay and the remote client

pub mod requests;
pub mod responses;

pub use requests::ActorQuery;
pub use responses::{
    HealthChecks, HealthResponse, LikeChangeMessage, LikeCountResponse, LikeStatusResponse,
    LikeSummaryResponse, ReadinessResponse,
};
