//! Session data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use super::paths::resolve_path;

/// Identifier of a diff session.
///
/// Derived from the wall clock in milliseconds and strictly increasing for
/// the lifetime of the process. Serialized as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SessionId(u64);

impl SessionId {
    /// Wraps a raw millisecond value.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the millisecond value the id was derived from.
    #[must_use]
    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a path segment is not a session id.
#[derive(Debug, Error)]
#[error("Invalid session id: {0}")]
pub struct ParseSessionIdError(pub String);

impl FromStr for SessionId {
    type Err = ParseSessionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| ParseSessionIdError(s.to_string()))
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for SessionId {
    type Error = ParseSessionIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An open diff session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSession {
    /// Unique id, assigned at creation.
    pub id: SessionId,
    /// Resolved left file path.
    pub left_path: Option<PathBuf>,
    /// Resolved right file path.
    pub right_path: Option<PathBuf>,
    /// Authoritative content; the only side ever written back to disk.
    pub left_content: Option<String>,
    /// Proposed content.
    pub right_content: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl DiffSession {
    /// Stores `content` on every side backed by `path`. Returns true if any
    /// side matched.
    pub fn refresh(&mut self, path: &Path, content: &str) -> bool {
        let mut matched = false;
        if self.left_path.as_deref() == Some(path) {
            self.left_content = Some(content.to_string());
            matched = true;
        }
        if self.right_path.as_deref() == Some(path) {
            self.right_content = Some(content.to_string());
            matched = true;
        }
        matched
    }

    /// Iterates over the file paths behind this session.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.left_path
            .as_deref()
            .into_iter()
            .chain(self.right_path.as_deref())
    }
}

/// One side of a diff as submitted by a client.
#[derive(Debug, Clone, Default)]
pub struct SideInput {
    /// Path, absolute or relative to the working-directory hint.
    pub path: Option<String>,
    /// Inline content; takes precedence over reading `path`.
    pub content: Option<String>,
}

/// Both sides of a new session with paths resolved and content loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSource {
    /// Resolved left path.
    pub left_path: Option<PathBuf>,
    /// Resolved right path.
    pub right_path: Option<PathBuf>,
    /// Left content, inline or read from disk.
    pub left_content: Option<String>,
    /// Right content, inline or read from disk.
    pub right_content: Option<String>,
}

impl DiffSource {
    /// Resolves both sides against `base` and reads any content that was not
    /// supplied inline.
    ///
    /// A failed read leaves that side's content absent; it never fails the
    /// whole load.
    pub async fn load(left: SideInput, right: SideInput, base: &Path) -> Self {
        let (left_path, left_content) = load_side(left, base).await;
        let (right_path, right_content) = load_side(right, base).await;
        Self {
            left_path,
            right_path,
            left_content,
            right_content,
        }
    }
}

async fn load_side(input: SideInput, base: &Path) -> (Option<PathBuf>, Option<String>) {
    let path = input
        .path
        .filter(|p| !p.is_empty())
        .map(|p| resolve_path(&p, base));

    if input.content.is_some() {
        return (path, input.content);
    }

    let Some(ref file) = path else {
        return (None, None);
    };

    match tokio::fs::read_to_string(file).await {
        Ok(content) => (path, Some(content)),
        Err(e) => {
            warn!(path = %file.display(), error = %e, "Failed to read diff side, continuing without content");
            (path, None)
        }
    }
}
