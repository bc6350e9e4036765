//! CLI bootstrap - the composition root.
//!
//! This is the only place where the gateway is wired together: logging,
//! configuration validation, the model registry, the backend client and
//! the HTTP listener.

use anyhow::{Context, Result};
use ollagate_core::{GatewayConfig, ModelRegistry};
use ollagate_proxy::{GatewayState, serve};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG`, when set and valid, wins over the configured level.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Build the shared gateway state from a validated configuration.
///
/// A missing models file yields an empty registry; an unreadable or
/// malformed one is fatal.
pub fn build_state(config: &GatewayConfig) -> Result<GatewayState> {
    let registry = ModelRegistry::load_optional(&config.models_file).with_context(|| {
        format!(
            "failed to load models file {}",
            config.models_file.display()
        )
    })?;
    info!(
        path = %config.models_file.display(),
        bases = registry.bases().len(),
        models = registry.len(),
        "Model registry loaded"
    );

    if config.openai_api_key.is_empty() {
        warn!("No backend API key configured, requests are sent without credentials");
    }

    GatewayState::from_config(config, registry).context("failed to create backend client")
}

/// Validate the configuration, bind the listener and serve until Ctrl-C.
pub async fn run(config: GatewayConfig) -> Result<()> {
    config.validate()?;
    let state = build_state(&config)?;

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
        }
        shutdown.cancel();
    });

    serve(listener, state, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_with_models(path: std::path::PathBuf) -> GatewayConfig {
        GatewayConfig {
            models_file: path,
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_missing_models_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let state = build_state(&config_with_models(dir.path().join("models.yml"))).unwrap();
        assert!(state.registry.is_empty());
    }

    #[test]
    fn test_models_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "models:\n  - name: gpt-4o\n    output_tokens: 16000").unwrap();

        let state = build_state(&config_with_models(file.path().to_path_buf())).unwrap();
        assert_eq!(state.registry.len(), 1);
        assert_eq!(
            state.registry.get_model("gpt-4o").unwrap().effective_output_tokens(),
            16_000
        );
    }

    #[test]
    fn test_malformed_models_file_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "models: [").unwrap();

        let err = build_state(&config_with_models(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("failed to load models file"));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_binding() {
        let config = GatewayConfig {
            log_level: "loud".to_string(),
            ..GatewayConfig::default()
        };
        let err = run(config).await.unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }
}
