//! HTTP and WebSocket handlers

pub mod health;
pub mod likes;
pub mod ws;
