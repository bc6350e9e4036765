//! Forwarding translated chat requests to the backend.
//!
//! A streamed request gets the backend body relayed chunk by chunk with
//! event-stream headers. A buffered request has the whole body read first
//! and re-emitted with the backend's status and content type.

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use tracing::error;

use crate::backend::{BackendError, CloudBackend};
use crate::error::GatewayError;
use crate::models::CloudChatRequest;
use crate::relay::relay;

/// Send `chat` to the backend and build the client response.
pub async fn forward_chat_completion(
    backend: &CloudBackend,
    chat: &CloudChatRequest,
) -> Result<Response, GatewayError> {
    let response = backend.send_chat(chat).await?;

    if chat.stream {
        Ok(forward_streaming_response(response))
    } else {
        forward_buffered_response(response).await
    }
}

/// Relay an event-stream response as it arrives.
fn forward_streaming_response(response: reqwest::Response) -> Response {
    let body = Body::from_stream(relay(response.bytes_stream().boxed()));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("x-accel-buffering", "no") // Disable nginx buffering
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Read the full backend body and re-emit it.
async fn forward_buffered_response(response: reqwest::Response) -> Result<Response, GatewayError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let body = response.bytes().await.map_err(|e| {
        error!("Failed to read backend response: {e}");
        BackendError::Transport(e)
    })?;

    Ok(Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}
