//! Event payloads and transport errors.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::session::{DiffSession, SessionId};

/// Unique identifier for a connected subscriber, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Generates a new unique client ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event pushed to every subscriber.
///
/// Serialized as a JSON object tagged by `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// A session was created, reopened, or is being replayed to a new
    /// subscriber.
    Diff(DiffSession),
    /// A watched file changed on disk.
    FileChange {
        /// Resolved path of the file.
        path: PathBuf,
        /// Content read after the change.
        content: String,
    },
    /// A session was closed.
    DiffClosed {
        /// Id of the closed session.
        id: SessionId,
    },
}

impl ServerEvent {
    /// Serializes the event into the JSON payload of one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be serialized to JSON.
    pub fn to_frame_payload(&self) -> Result<String, EventError> {
        serde_json::to_string(self).map_err(EventError::Serialization)
    }

    /// Short name for logs and metrics labels.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Diff(_) => "diff",
            Self::FileChange { .. } => "file_change",
            Self::DiffClosed { .. } => "diff_closed",
        }
    }
}

/// Errors raised while delivering events.
#[derive(Debug, Error)]
pub enum EventError {
    /// The WebSocket transport failed.
    #[error("WebSocket connection error: {0}")]
    AxumWs(#[from] axum::Error),

    /// An event could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The broadcaster was dropped.
    #[error("Broadcast channel closed")]
    ChannelClosed,

    /// The subscriber fell too far behind and is disconnected.
    #[error("Subscriber lagged behind by {0} events")]
    Lagged(u64),
}
