//! HTTP client for the daemon's control API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::connection::HealthProbe;
use crate::document::SaveTarget;
use crate::error::ClientError;

#[derive(Serialize)]
struct SaveBody<'a> {
    content: &'a str,
    path: &'a str,
}

/// Talks to a running daemon.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    http: Client,
    base_url: String,
}

impl DaemonClient {
    /// Creates a client for the daemon at `base_url`, e.g.
    /// `http://127.0.0.1:3000`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// The daemon's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable or not healthy.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn health(&self) -> Result<(), ClientError> {
        let response = self.http.get(self.url("/health")).send().await?;
        check_status(response).await
    }

    /// `POST /save`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the daemon rejects the save.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn save(&self, path: &str, content: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/save"))
            .json(&SaveBody { content, path })
            .send()
            .await?;
        check_status(response).await?;
        debug!("Saved");
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl HealthProbe for DaemonClient {
    async fn check(&self) -> Result<(), ClientError> {
        self.health().await
    }
}

#[async_trait]
impl SaveTarget for DaemonClient {
    async fn save(&self, path: &str, content: &str) -> Result<(), ClientError> {
        DaemonClient::save(self, path, content).await
    }
}
