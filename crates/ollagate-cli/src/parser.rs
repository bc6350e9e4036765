//! Command-line and environment parsing.
//!
//! Every flag falls back to its `PROXY_*` environment variable, then to
//! the built-in default. A `.env` file in the working directory is loaded
//! into the environment before parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ollagate_core::config::{
    DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_MODELS_FILE, DEFAULT_OPENAI_BASE_URL, DEFAULT_PORT,
};
use ollagate_core::{GatewayConfig, parse_timeout};

/// Serve the local-runtime API in front of an OpenAI-compatible backend.
#[derive(Debug, Parser)]
#[command(name = "ollagate")]
#[command(about = "Local-runtime API gateway for OpenAI-compatible backends")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "PROXY_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PROXY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Base URL of the OpenAI-compatible backend
    #[arg(long, env = "PROXY_OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// API key sent to the backend as a bearer token
    #[arg(long, env = "PROXY_OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub openai_api_key: String,

    /// Log level: debug, info, warn or error (RUST_LOG takes precedence)
    #[arg(long, env = "PROXY_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Backend timeout as a duration ("5m", "90s") or seconds; 0 disables it
    #[arg(long, env = "PROXY_TIMEOUT", default_value = "5m", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Path to the models YAML file
    #[arg(long, env = "PROXY_MODELS_FILE", default_value = DEFAULT_MODELS_FILE)]
    pub models_file: PathBuf,
}

impl Cli {
    /// Convert the parsed arguments into a gateway configuration.
    pub fn into_config(self) -> GatewayConfig {
        GatewayConfig {
            host: self.host,
            port: self.port,
            openai_base_url: self.openai_base_url,
            openai_api_key: self.openai_api_key,
            log_level: self.log_level.to_lowercase(),
            timeout: self.timeout,
            models_file: self.models_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "ollagate",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--openai-base-url",
            "http://localhost:4000/v1",
            "--openai-api-key",
            "sk-test",
            "--log-level",
            "DEBUG",
            "--timeout",
            "30",
            "--models-file",
            "/etc/ollagate/models.yml",
        ]);
        let config = cli.into_config();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.openai_base_url, "http://localhost:4000/v1");
        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.models_file, PathBuf::from("/etc/ollagate/models.yml"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_accepts_duration_strings() {
        let cli = Cli::parse_from(["ollagate", "--timeout", "1m30s"]);
        assert_eq!(cli.timeout, Duration::from_secs(90));

        let cli = Cli::parse_from(["ollagate", "--timeout", "0"]);
        assert!(cli.into_config().upstream_timeout().is_none());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["ollagate", "--timeout", "-5s"]).is_err());
        assert!(Cli::try_parse_from(["ollagate", "--timeout", "later"]).is_err());
    }
}
