//! Axum HTTP server for the gateway.
//!
//! This module provides the shared state, the router and the `serve()`
//! function that runs it on a pre-bound `TcpListener`.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::Response,
    routing::{get, post},
};
use bytes::Bytes;
use ollagate_core::{GatewayConfig, ModelRegistry};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, warn};

use crate::backend::{BackendError, CloudBackend};
use crate::cache::ListingCache;
use crate::error::{GatewayError, OpenAiError};
use crate::forward::forward_chat_completion;
use crate::models::ChatCompletionRequest;
use crate::ollama_handlers::{not_implemented, ollama_show, ollama_tags, ollama_version};
use crate::translate::translate_chat_request;

/// Shared gateway state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct GatewayState {
    /// Client for the cloud backend.
    pub backend: Arc<CloudBackend>,
    /// Read-only model registry.
    pub registry: Arc<ModelRegistry>,
    /// Last successful model listing.
    pub listing: Arc<ListingCache>,
}

impl GatewayState {
    pub fn new(backend: CloudBackend, registry: ModelRegistry) -> Self {
        Self {
            backend: Arc::new(backend),
            registry: Arc::new(registry),
            listing: Arc::new(ListingCache::new()),
        }
    }

    /// Build the state from configuration and a loaded registry.
    pub fn from_config(config: &GatewayConfig, registry: ModelRegistry) -> Result<Self, BackendError> {
        let backend = CloudBackend::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.upstream_timeout(),
        )?;
        Ok(Self::new(backend, registry))
    }
}

/// Build the gateway router with its middleware.
pub fn create_router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/version", get(ollama_version))
        .route("/api/tags", get(ollama_tags))
        .route("/api/show", post(ollama_show))
        .route("/v1/chat/completions", post(chat_completions))
        .fallback(not_implemented)
        .layer(CatchPanicLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Start the gateway with a pre-bound listener.
///
/// Runs until the cancellation token is triggered.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        backend = %state.backend.base_url(),
        models = state.registry.len(),
        "Gateway starting on {addr}"
    );

    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Gateway shut down");
    Ok(())
}

/// Translate a chat completion and forward it to the backend.
async fn chat_completions(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, OpenAiError> {
    debug!("POST /v1/chat/completions");

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GatewayError::bad_request("Request body is empty").into());
    }

    let request: ChatCompletionRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Invalid chat completion request");
        GatewayError::bad_request(e.to_string())
    })?;

    info!(
        model = %request.model,
        streaming = request.stream,
        "Processing chat completion request"
    );

    let chat = translate_chat_request(request, &state.registry)?;
    Ok(forward_chat_completion(&state.backend, &chat).await?)
}
