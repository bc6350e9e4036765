//! Gateway error type and its HTTP mappings.
//!
//! `/api/*` routes answer with the local envelope `{"error": "..."}`;
//! `/v1/*` routes wrap the error in [`OpenAiError`] to answer with the
//! cloud envelope `{"error": {"message", "type", "param", "code"}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ollagate_core::OptionsError;
use thiserror::Error;
use tracing::error;

use crate::backend::BackendError;
use crate::models;
use crate::ollama_models;

/// Errors a request can end with.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client input was rejected.
    #[error("{0}")]
    BadRequest(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Anything else, including backend transport failures.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OptionsError> for GatewayError {
    fn from(err: OptionsError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// Backend failures keep the backend's status when there is one. The
/// backend's error body is never echoed to the client.
impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status(status) => Self::Upstream {
                status,
                message: "Backend API error".to_string(),
            },
            BackendError::InvalidBaseUrl(_) => Self::internal("Invalid base URL"),
            BackendError::Encode(_) => Self::internal("Failed to marshal request payload"),
            BackendError::Transport(_) | BackendError::Timeout(_) => {
                Self::internal("Failed to send request to backend")
            }
            BackendError::Decode(_) => Self::internal("Failed to decode backend response"),
        }
    }
}

fn log_internal(err: &GatewayError) {
    if let GatewayError::Internal(msg) = err {
        error!(error = %msg, "Request failed");
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        log_internal(&self);
        let status = self.status();
        (status, Json(ollama_models::ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Renders a [`GatewayError`] in the cloud-dialect error shape.
#[derive(Debug)]
pub struct OpenAiError(pub GatewayError);

impl From<GatewayError> for OpenAiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl From<BackendError> for OpenAiError {
    fn from(err: BackendError) -> Self {
        Self(err.into())
    }
}

impl From<OptionsError> for OpenAiError {
    fn from(err: OptionsError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for OpenAiError {
    fn into_response(self) -> Response {
        log_internal(&self.0);
        let status = self.0.status();
        (
            status,
            Json(models::ErrorResponse::new(status, self.0.to_string())),
        )
            .into_response()
    }
}
