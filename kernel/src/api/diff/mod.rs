//! Diff session endpoints.

pub mod handlers;
pub mod routes;
pub mod types;

pub use routes::routes;
