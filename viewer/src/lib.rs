//! Meld viewer - the client side of a diff session.
//!
//! The centrepiece is [`merge::ChunkMerger`], which copies diff chunks from
//! the right (proposed) buffer into the left (original) one and keeps a
//! single undo history across both. Around it sit the pieces a viewer needs
//! to work with the daemon: event payload parsing, save and close handling,
//! chunk navigation and the connection indicator.
//!
//! Diff computation itself is left to the host editor; this crate consumes
//! its chunks.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod buffer;
pub mod chunk;
pub mod client;
pub mod connection;
pub mod document;
pub mod error;
pub mod events;
pub mod merge;
pub mod navigation;
pub mod normalize;
pub mod oplog;

pub use buffer::{ContentChange, Position, Range, TextBuffer};
pub use chunk::{DiffChunk, find_chunk_for_line};
pub use client::DaemonClient;
pub use connection::{ConnectionState, ConnectionStatus, HealthProbe};
pub use document::{
    CloseChoice, CloseDecision, ClosePrompt, ConfirmDialog, MergeDocument, SaveTarget,
};
pub use error::{ClientError, CloseError};
pub use events::{DaemonEvent, SessionSnapshot};
pub use merge::{AcceptOutcome, ChunkMerger};
pub use navigation::{next_change, previous_change};
pub use normalize::normalize_content;
pub use oplog::{BufferSide, OperationLog, OperationLogEntry};
