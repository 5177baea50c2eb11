use serde::{Deserialize, Serialize};

use crate::session::{ClosedSession, DiffSession, SessionId, SideInput};

/// Body of `POST /diff`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiffRequest {
    /// Left (authoritative) file path.
    #[serde(default)]
    pub left_path: Option<String>,
    /// Right (proposed) file path.
    #[serde(default)]
    pub right_path: Option<String>,
    /// Inline left content; wins over reading `left_path`.
    #[serde(default)]
    pub left_content: Option<String>,
    /// Inline right content; wins over reading `right_path`.
    #[serde(default)]
    pub right_content: Option<String>,
    /// Working directory the relative paths were typed in.
    #[serde(default)]
    pub pwd: Option<String>,
}

impl CreateDiffRequest {
    /// Splits the request into its two sides.
    #[must_use]
    pub fn into_sides(self) -> (SideInput, SideInput, Option<String>) {
        (
            SideInput {
                path: self.left_path,
                content: self.left_content,
            },
            SideInput {
                path: self.right_path,
                content: self.right_content,
            },
            self.pwd,
        )
    }
}

/// `{"status":"ok"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always `"ok"`.
    pub status: String,
}

impl StatusResponse {
    /// The success body.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Response of `POST /diff`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDiffResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Id of the new session.
    pub id: SessionId,
}

/// Single-session shape returned by `GET /diff`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDiffResponse {
    /// Left path, or null.
    pub left_path: Option<String>,
    /// Right path, or null.
    pub right_path: Option<String>,
    /// Left content, or null.
    pub left_content: Option<String>,
    /// Right content, or null.
    pub right_content: Option<String>,
}

impl From<&DiffSession> for LegacyDiffResponse {
    fn from(session: &DiffSession) -> Self {
        Self {
            left_path: session.left_path.as_ref().map(|p| p.display().to_string()),
            right_path: session.right_path.as_ref().map(|p| p.display().to_string()),
            left_content: session.left_content.clone(),
            right_content: session.right_content.clone(),
        }
    }
}

/// Response of `GET /diff/history`, most recently closed first.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    /// Closed sessions.
    pub closed: Vec<ClosedSession>,
}
