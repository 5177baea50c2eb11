//! Error types for talking to the daemon and closing documents.

use thiserror::Error;

/// Errors from the daemon's HTTP API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the response not read.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The daemon answered with a non-success status.
    #[error("Daemon returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The daemon's `error` message, or the raw body.
        message: String,
    },
}

/// Errors that keep a document open after the user chose to close it.
#[derive(Debug, Error)]
pub enum CloseError {
    /// The user chose Save but the left side has no file behind it.
    #[error("Document has no file path to save to")]
    NoSavePath,

    /// Saving failed; the document stays open with its edits.
    #[error("Save failed: {0}")]
    Save(#[from] ClientError),
}
