//! Shared helpers for the gateway route tests.

#![allow(dead_code)]

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use ollagate_core::ModelRegistry;
use ollagate_proxy::{CloudBackend, GatewayState, create_router};
use tower::ServiceExt;

pub const API_KEY: &str = "test-key";

pub const MODELS_YAML: &str = "bases:
  - name: gpt-4
    capabilities: [completion, tools, vision]
    input_tokens: 100000
    output_tokens: 8000
models:
  - name: gpt-4.1-mini
    base: gpt-4
";

/// Gateway state pointing at `base_url` with the test registry.
pub fn gateway(base_url: &str) -> GatewayState {
    gateway_with_timeout(base_url, None)
}

pub fn gateway_with_timeout(base_url: &str, timeout: Option<Duration>) -> GatewayState {
    let backend = CloudBackend::new(base_url, API_KEY, timeout).unwrap();
    let registry = ModelRegistry::from_yaml_str(MODELS_YAML).unwrap();
    GatewayState::new(backend, registry)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Run one request through a fresh router built on `state`.
pub async fn send(state: GatewayState, request: Request<Body>) -> TestResponse {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}
