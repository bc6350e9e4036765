//! Local-dialect (`/api/*`) route handlers.
//!
//! These answer the discovery endpoints local-runtime clients query before
//! chatting: the version, the model list (fetched from the backend) and
//! per-model details (served from the model registry).

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::backend::BackendError;
use crate::error::GatewayError;
use crate::ollama_models::{
    ErrorResponse, ListResponse, OLLAMA_API_VERSION, ShowRequest, ShowResponse, VersionResponse,
};
use crate::server::GatewayState;

// ── GET /api/version ───────────────────────────────────────────────────

pub(crate) async fn ollama_version() -> impl IntoResponse {
    Json(VersionResponse {
        version: OLLAMA_API_VERSION.to_string(),
    })
}

// ── GET /api/tags ──────────────────────────────────────────────────────

pub(crate) async fn ollama_tags(
    State(state): State<GatewayState>,
) -> Result<Json<ListResponse>, GatewayError> {
    debug!("GET /api/tags");

    let backend_models = state.backend.list_models().await.map_err(|e| {
        warn!(error = %e, "Failed to fetch models");
        match e {
            BackendError::Status(status) => GatewayError::Upstream {
                status,
                message: "Failed to fetch models".to_string(),
            },
            BackendError::Decode(_) => GatewayError::internal("Failed to decode models response"),
            other => GatewayError::from(other),
        }
    })?;

    let listing = Arc::new(ListResponse::from_cloud(&backend_models.data));
    state.listing.replace(Arc::clone(&listing)).await;
    debug!(models = listing.models.len(), "Model listing refreshed");

    Ok(Json(Arc::unwrap_or_clone(listing)))
}

// ── POST /api/show ─────────────────────────────────────────────────────

pub(crate) async fn ollama_show(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<ShowResponse>, GatewayError> {
    let req: ShowRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Invalid /api/show request");
        GatewayError::bad_request("Invalid model name")
    })?;

    let name = req.effective_model();
    if name.is_empty() {
        return Err(GatewayError::bad_request("Model name is required"));
    }
    debug!(model = %name, "POST /api/show");

    let view = state.registry.resolve_or_default(name);
    Ok(Json(ShowResponse::from_view(&view)))
}

// ── Fallback ───────────────────────────────────────────────────────────

/// Any route the gateway does not serve.
pub(crate) async fn not_implemented(method: Method, uri: Uri) -> impl IntoResponse {
    info!(method = %method, path = %uri.path(), "Not Implemented");
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ErrorResponse::new("Not Implemented")),
    )
}
