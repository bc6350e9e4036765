//! HTTP adapter for the ollagate gateway.
//!
//! Serves the local-runtime API (`/api/version`, `/api/tags`, `/api/show`)
//! and an OpenAI-compatible `/v1/chat/completions` in front of a backend
//! that only speaks the cloud dialect. Chat requests are translated
//! (local extras dropped, options mapped, the model's output budget
//! applied) and forwarded; responses are relayed buffered or streamed.

#![deny(unsafe_code)]

pub mod backend;
pub mod cache;
pub mod error;
pub mod forward;
pub mod models;
pub mod ollama_handlers;
pub mod ollama_models;
pub mod relay;
pub mod server;
pub mod translate;

pub use backend::{BackendError, CloudBackend};
pub use cache::ListingCache;
pub use error::{GatewayError, OpenAiError};
pub use server::{GatewayState, create_router, serve};
