//! Payloads received on the daemon's event stream.

use serde::Deserialize;

/// An open diff as announced by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Session id.
    pub id: String,
    /// Left file path.
    #[serde(default)]
    pub left_path: Option<String>,
    /// Right file path.
    #[serde(default)]
    pub right_path: Option<String>,
    /// Left content.
    #[serde(default)]
    pub left_content: Option<String>,
    /// Right content.
    #[serde(default)]
    pub right_content: Option<String>,
}

/// One event frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DaemonEvent {
    /// A session was created, reopened or replayed on connect.
    Diff(SessionSnapshot),
    /// A watched file changed on disk.
    FileChange {
        /// Absolute path of the file.
        path: String,
        /// Its new content.
        content: String,
    },
    /// A session was closed.
    DiffClosed {
        /// Id of the closed session.
        id: String,
    },
}

impl DaemonEvent {
    /// Parses one `data:` payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a known event.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
