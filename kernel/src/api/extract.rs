//! Request body extraction.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// JSON body extractor that does not require a `Content-Type` header and
/// reports malformed input as [`ApiError::InvalidBody`].
///
/// Shell tools posting with a bare `curl -d` are accepted.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
        if bytes.is_empty() {
            return Err(ApiError::InvalidBody("body is empty".to_string()));
        }
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::InvalidBody(e.to_string()))
    }
}
