//! Watch events and errors.

use std::path::PathBuf;
use thiserror::Error;

/// Fresh content of a watched file after a change on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChanged {
    /// Watched path, as registered.
    pub path: PathBuf,
    /// Content read after the change settled.
    pub content: String,
}

/// Errors raised while setting up a watch.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The native watcher could not be created or attached.
    #[error("Failed to watch '{path}': {source}")]
    Notify {
        /// File the watch was for.
        path: PathBuf,
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },
    /// The path has no parent directory to attach the watch to.
    #[error("Path has no parent directory: {0}")]
    NoParent(PathBuf),
}
