//! Writes merged content back to disk.
//!
//! Content is written to a staging file next to the target and renamed over
//! it, so a failed save leaves the original file untouched.

use axum::extract::Json;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use super::diff::types::StatusResponse;
use super::{ApiError, JsonBody};
use crate::infrastructure::audit::{log_audit, AuditEvent};
use crate::session::paths::{process_cwd, resolve_path};

/// Body of `POST /save`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveRequest {
    /// Full file content to write.
    #[serde(default)]
    pub content: Option<String>,
    /// Target path, absolute or relative to the daemon's working directory.
    #[serde(default)]
    pub path: Option<String>,
}

/// POST /save
#[instrument(skip_all)]
pub async fn save_file(
    JsonBody(request): JsonBody<SaveRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let raw_path = request
        .path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("No file path provided".to_string()))?;
    let content = request
        .content
        .ok_or_else(|| ApiError::Validation("No content provided".to_string()))?;

    let path = resolve_path(&raw_path, &process_cwd());
    write_staged(&path, content.as_bytes())
        .await
        .map_err(|source| ApiError::SaveFailed {
            path: path.clone(),
            source,
        })?;

    metrics::counter!("meld_saves_total").increment(1);
    log_audit(&AuditEvent::FileSaved {
        path: path.display().to_string(),
        bytes: content.len(),
    });
    info!(path = %path.display(), bytes = content.len(), "File saved");

    Ok(Json(StatusResponse::ok()))
}

/// Writes `bytes` to a sibling staging file, then renames it onto `target`.
///
/// # Errors
///
/// Returns the I/O error of the first failing step. The staging file is
/// removed on failure.
pub async fn write_staged(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let staging = staging_path(target)?;
    debug!(staging = %staging.display(), "Staging save");

    let result = async {
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, target).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&staging).await;
    }
    result
}

fn staging_path(target: &Path) -> std::io::Result<PathBuf> {
    let (Some(parent), Some(name)) = (target.parent(), target.file_name()) else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "save target has no file name",
        ));
    };
    let staging_name = format!(
        ".{}.meld-{}.tmp",
        name.to_string_lossy(),
        uuid::Uuid::new_v4()
    );
    Ok(parent.join(staging_name))
}
