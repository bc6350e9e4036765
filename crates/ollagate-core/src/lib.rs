//! Core types for the ollagate gateway.
//!
//! This crate has no HTTP dependencies. It holds:
//!
//! - [`registry`]: the model registry read from the models YAML file,
//!   with base-template inheritance for capabilities and token budgets.
//! - [`domain`]: generation option decoding, keep-alive and duration
//!   strings, and model capabilities.
//! - [`config`]: the gateway configuration and its validation.
//!
//! The HTTP surface lives in `ollagate-proxy`; process startup lives in
//! `ollagate-cli`.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod registry;

pub use config::{
    ConfigError, ConfigViolation, DEFAULT_PORT, GatewayConfig, TimeoutParseError, parse_timeout,
};
pub use domain::{
    Capability, CapabilitySet, DecodedOptions, DurationParseError, GenerationOptions, KeepAlive,
    OptionKind, OptionsError, decode_options, default_capabilities, format_duration,
    parse_duration,
};
pub use registry::{BaseModel, ModelEntry, ModelRegistry, ModelView, ModelsDocument, RegistryError};

// Used by the integration tests under tests/
#[cfg(test)]
use tempfile as _;
