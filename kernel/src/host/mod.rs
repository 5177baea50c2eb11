//! Shared daemon state and host collaborators.

pub mod attention;
pub mod state;

pub use attention::{AttentionSink, LogAttention};
pub use state::MeldState;
