use serde::Serialize;
use tracing::{info, info_span};

/// Lifecycle event recorded on the `audit` target.
/// Structured for JSON serialization so a subscriber can route the audit
/// trail to its own sink.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    SystemStartup {
        component: String,
        address: String,
    },
    SystemShutdown {
        reason: String,
    },
    DiffOpened {
        id: String,
        left_path: Option<String>,
        right_path: Option<String>,
    },
    DiffClosed {
        id: String,
    },
    FileSaved {
        path: String,
        bytes: usize,
    },
}

/// Logs an audit event to the dedicated audit channel as structured JSON.
pub fn log_audit(event: &AuditEvent) {
    let span = info_span!(target: "audit", "audit_event");
    let _enter = span.enter();

    let json = serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"));
    info!(target: "audit", audit_json = %json, "Audit event");
}
