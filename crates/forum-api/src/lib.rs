//! # forum-api
//!
//! Like relay server built with Axum: REST endpoints over the Postgres like
//! store and a per-post WebSocket change feed.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run};
pub use state::AppState;
