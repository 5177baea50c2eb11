//! Live event stream for connected viewers.
//!
//! Events fan out through a [`Broadcaster`]; viewers consume them either as
//! Server-Sent Events (`/events`) or over a WebSocket (`/ws`). Both
//! transports replay the open sessions before streaming live events.

pub mod broadcaster;
pub mod connection;
pub mod handler;
pub mod sse;
pub mod types;

pub use broadcaster::{BroadcastReceiver, Broadcaster};
pub use types::{ClientId, EventError, ServerEvent};
