//! Composition root for the `ollagate` binary.
//!
//! Parses flags and `PROXY_*` environment variables into a
//! [`ollagate_core::GatewayConfig`], then wires the registry, backend
//! client and HTTP server together.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs
use dotenvy as _;

pub mod bootstrap;
pub mod parser;

pub use bootstrap::{build_state, init_tracing, run};
pub use parser::Cli;
