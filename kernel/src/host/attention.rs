//! Requests to bring the viewer to the user's attention.

use tracing::info;

use crate::session::DiffSession;

/// Host hook invoked when a new diff arrives, so the embedding shell can
/// raise or focus the viewer window.
pub trait AttentionSink: Send + Sync {
    /// Called once per created or reopened session.
    fn request_attention(&self, session: &DiffSession);
}

/// Default sink for headless runs: records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAttention;

impl AttentionSink for LogAttention {
    fn request_attention(&self, session: &DiffSession) {
        info!(session_id = %session.id, "Viewer attention requested");
    }
}
