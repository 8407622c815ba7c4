//! Axum extractors for request handling

mod path;
mod validated;

pub use path::PostIdPath;
pub use validated::ValidatedQuery;
