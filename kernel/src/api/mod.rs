//! HTTP control API.
//!
//! External tools hand diffs to the daemon through these endpoints; viewers
//! use them to save, close and reopen diffs and to probe the connection.

pub mod diff;
pub mod error;
pub mod extract;
pub mod save;
pub mod system;

pub use error::ApiError;
pub use extract::JsonBody;

use axum::{
    routing::{get, post},
    Router,
};

use crate::events::{handler::handle_ws_upgrade, sse::handle_events};
use crate::host::MeldState;

/// All control API routes, including both event transports.
pub fn routes() -> Router<MeldState> {
    Router::new()
        .merge(diff::routes())
        .route("/save", post(save::save_file))
        .route("/health", get(system::health_check))
        .route("/events", get(handle_events))
        .route("/ws", get(handle_ws_upgrade))
}
