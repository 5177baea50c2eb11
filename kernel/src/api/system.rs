//! Liveness endpoint.

use axum::extract::Json;

use crate::api::diff::types::StatusResponse;

/// GET /health
///
/// Always `{"status":"ok"}` while the daemon is serving. Viewers poll it to
/// drive their connection indicator.
pub async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}
