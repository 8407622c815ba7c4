//! Integration test utilities for the like relay
//!
//! Helpers for running end-to-end tests against the REST API, the
//! WebSocket feed, and the synchronizer's remote client.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
