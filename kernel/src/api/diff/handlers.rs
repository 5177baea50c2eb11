use axum::extract::{Json, Path, State};
use tracing::{info, instrument};

use super::types::{
    CreateDiffRequest, CreateDiffResponse, HistoryResponse, LegacyDiffResponse, StatusResponse,
};
use crate::api::{ApiError, JsonBody};
use crate::host::MeldState;
use crate::session::{paths::process_cwd, DiffSource, SessionId};

/// POST /diff
///
/// Resolves both sides, loads whatever content was not sent inline and opens
/// a new session. Sides that cannot be read are stored without content.
#[instrument(skip_all)]
pub async fn create_diff(
    State(state): State<MeldState>,
    JsonBody(request): JsonBody<CreateDiffRequest>,
) -> Result<Json<CreateDiffResponse>, ApiError> {
    let (left, right, pwd) = request.into_sides();
    let cwd = process_cwd();
    let base = match pwd.as_deref() {
        Some(dir) if !dir.is_empty() => cwd.join(dir),
        _ => cwd,
    };

    let source = DiffSource::load(left, right, &base).await;
    let session = state.create_diff(source);
    info!(session_id = %session.id, "Diff opened");

    Ok(Json(CreateDiffResponse {
        status: "ok".to_string(),
        id: session.id,
    }))
}

/// GET /diff
pub async fn latest_diff(State(state): State<MeldState>) -> Json<LegacyDiffResponse> {
    let body = state
        .latest_session()
        .as_ref()
        .map(LegacyDiffResponse::from)
        .unwrap_or_default();
    Json(body)
}

/// DELETE /diff/{id}
#[instrument(skip(state))]
pub async fn delete_diff(
    State(state): State<MeldState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id: SessionId = id.parse().map_err(|_| ApiError::DiffNotFound)?;
    state.delete_diff(id).ok_or(ApiError::DiffNotFound)?;
    info!(session_id = %id, "Diff closed");
    Ok(Json(StatusResponse::ok()))
}

/// GET /diff/history
pub async fn list_history(State(state): State<MeldState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        closed: state.closed_sessions(),
    })
}

/// POST /diff/reopen/{id}
#[instrument(skip(state))]
pub async fn reopen_diff(
    State(state): State<MeldState>,
    Path(id): Path<String>,
) -> Result<Json<CreateDiffResponse>, ApiError> {
    let id: SessionId = id.parse().map_err(|_| ApiError::DiffNotFound)?;
    let session = state.reopen_diff(id).ok_or(ApiError::DiffNotFound)?;
    info!(session_id = %session.id, "Diff reopened");
    Ok(Json(CreateDiffResponse {
        status: "ok".to_string(),
        id: session.id,
    }))
}

/// DELETE /diff/history
pub async fn clear_history(State(state): State<MeldState>) -> Json<StatusResponse> {
    state.clear_history();
    Json(StatusResponse::ok())
}
