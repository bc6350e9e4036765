//! HTTP client for the cloud-dialect backend.
//!
//! Two calls are made against the configured base URL, both with
//! `Authorization: Bearer <key>`:
//!
//! - `GET {base}/models` for the model listing
//! - `POST {base}/chat/completions` for chat
//!
//! Nothing is retried. A buffered call is bounded end to end by the
//! configured timeout; a streamed call only until the response headers
//! arrive, after which the body may stay open as long as the backend
//! keeps it open.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::{Client, Response, Url, header};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{CloudChatRequest, ModelList};

/// Failures talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to encode backend request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("backend request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("backend did not respond within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("backend returned {0}")]
    Status(StatusCode),

    #[error("failed to decode backend response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Client for the cloud backend.
#[derive(Debug, Clone)]
pub struct CloudBackend {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Option<Duration>,
}

impl CloudBackend {
    /// Create a backend client. A `timeout` of `None` disables it.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(BackendError::Transport)?;
        Ok(Self::with_client(client, base_url, api_key, timeout))
    }

    /// Create a backend client around an existing HTTP client.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `path` onto the base URL, keeping any path the base already has.
    pub fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let url =
            Url::parse(&joined).map_err(|_| BackendError::InvalidBaseUrl(self.base_url.clone()))?;
        if matches!(url.scheme(), "http" | "https") {
            Ok(url)
        } else {
            Err(BackendError::InvalidBaseUrl(self.base_url.clone()))
        }
    }

    /// Fetch the backend's model listing.
    pub async fn list_models(&self) -> Result<ModelList, BackendError> {
        let url = self.endpoint("models")?;
        debug!(url = %url, "Fetching models from backend");

        let mut request = self.client.get(url).bearer_auth(&self.api_key);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Backend model listing failed");
            return Err(BackendError::Status(status));
        }

        response.json::<ModelList>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                BackendError::Decode(e)
            }
        })
    }

    /// Send a chat request and return the backend response once its
    /// headers arrived with a success status.
    ///
    /// The body is left unread so the caller can either buffer or relay it.
    pub async fn send_chat(&self, chat: &CloudChatRequest) -> Result<Response, BackendError> {
        let url = self.endpoint("chat/completions")?;
        let payload = serde_json::to_vec(chat)?;
        debug!(url = %url, model = %chat.model, stream = chat.stream, "Forwarding chat request");

        let mut request = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload);

        let sent = if chat.stream {
            request = request
                .header(header::ACCEPT, "text/event-stream")
                .header(header::CACHE_CONTROL, "no-cache");
            match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, request.send())
                    .await
                    .map_err(|_| BackendError::Timeout(timeout))?,
                None => request.send().await,
            }
        } else {
            if let Some(timeout) = self.timeout {
                request = request.timeout(timeout);
            }
            request.send().await
        };
        let response = sent.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, model = %chat.model, "Backend rejected chat request");
            return Err(BackendError::Status(status));
        }
        Ok(response)
    }

    fn transport_error(&self, err: reqwest::Error) -> BackendError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => BackendError::Timeout(timeout),
            _ => BackendError::Transport(err),
        }
    }
}
