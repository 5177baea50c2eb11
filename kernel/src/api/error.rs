//! Error type returned by every control API handler.

use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::path::PathBuf;
use tracing::{error, warn};

/// Errors surfaced to API clients as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body is not valid JSON or does not have the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    /// A required field is missing or empty.
    #[error("{0}")]
    Validation(String),
    /// No open (or closed, for reopen) diff has the requested id.
    #[error("Diff not found")]
    DiffNotFound,
    /// Writing the file failed; the file on disk is unchanged.
    #[error("Failed to save '{}': {source}", path.display())]
    SaveFailed {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DiffNotFound => StatusCode::NOT_FOUND,
            ApiError::SaveFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
