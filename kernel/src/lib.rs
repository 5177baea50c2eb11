//! Meld kernel - the diff hand-off daemon.
//!
//! External tools post a pair of texts (or file paths) to the daemon; it
//! keeps them as diff sessions, watches the backing files and streams every
//! change to connected viewers over Server-Sent Events or WebSocket.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// HTTP control API.
pub mod api;
/// Event types, broadcaster and subscriber transports.
pub mod events;
/// Shared daemon state and host collaborators.
pub mod host;
/// Infrastructure components (config, server, telemetry).
pub mod infrastructure;
/// Diff session registry.
pub mod session;
/// Filesystem watching for session files.
pub mod watch;
