//! Gateway configuration and validation.
//!
//! These are plain values; the CLI layer fills them from flags,
//! environment variables and `.env`.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::domain::{DurationParseError, parse_duration};

/// Default port, matching the local runtime's well-known port.
pub const DEFAULT_PORT: u16 = 11434;

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default upstream timeout (5 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const DEFAULT_MODELS_FILE: &str = "models.yml";

/// Log levels accepted by `log_level`.
pub const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

/// Runtime configuration for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub openai_base_url: String,
    pub openai_api_key: String,
    pub log_level: String,
    /// Upstream timeout. Zero disables it.
    pub timeout: Duration,
    pub models_file: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_api_key: String::new(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            models_file: PathBuf::from(DEFAULT_MODELS_FILE),
        }
    }
}

impl GatewayConfig {
    /// `host:port` suitable for binding a listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        if self.host.parse::<std::net::Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// The upstream timeout, or `None` when disabled.
    #[must_use]
    pub fn upstream_timeout(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }

    /// Check every field, reporting all violations at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut violations = Vec::new();

        if !is_valid_host(&self.host) {
            violations.push(ConfigViolation::InvalidHost(self.host.clone()));
        }

        if self.port == 0 {
            violations.push(ConfigViolation::InvalidPort(self.port));
        }

        match Url::parse(&self.openai_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => violations.push(ConfigViolation::InvalidBaseUrl(
                self.openai_base_url.clone(),
            )),
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            violations.push(ConfigViolation::InvalidLogLevel(self.log_level.clone()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { violations })
        }
    }
}

fn is_valid_host(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// A single invalid configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("host must be a hostname or IP address, got \"{0}\"")]
    InvalidHost(String),

    #[error("port must be between 1 and 65535, got {0}")]
    InvalidPort(u16),

    #[error("openai_base_url must be an absolute http(s) URL, got \"{0}\"")]
    InvalidBaseUrl(String),

    #[error("log_level must be one of debug, info, warn, error, got \"{0}\"")]
    InvalidLogLevel(String),
}

/// Configuration validation failure carrying every violation found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ConfigError {
    pub violations: Vec<ConfigViolation>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid configuration")?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

/// Errors from [`parse_timeout`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeoutParseError {
    #[error(transparent)]
    Duration(#[from] DurationParseError),

    #[error("timeout must not be negative, got \"{0}\"")]
    Negative(String),
}

/// Parse a timeout given either as a duration string (`"5m"`, `"90s"`)
/// or as a plain number of seconds (`"300"`, `"2.5"`).
pub fn parse_timeout(input: &str) -> Result<Duration, TimeoutParseError> {
    let trimmed = input.trim();

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_finite() {
            if seconds < 0.0 {
                return Err(TimeoutParseError::Negative(input.to_string()));
            }
            return Duration::try_from_secs_f64(seconds).map_err(|_| {
                TimeoutParseError::Duration(DurationParseError::Overflow(input.to_string()))
            });
        }
    }

    let parsed = parse_duration(trimmed)?;
    if parsed.is_negative() {
        return Err(TimeoutParseError::Negative(input.to_string()));
    }
    Ok(parsed.magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GatewayConfig::default();
        assert_eq!(config.port, 11434);
        assert_eq!(config.bind_addr(), "0.0.0.0:11434");
        assert_eq!(config.upstream_timeout(), Some(Duration::from_secs(300)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_violation() {
        let config = GatewayConfig {
            host: "bad host!".to_string(),
            port: 0,
            openai_base_url: "ftp://example.com".to_string(),
            log_level: "trace".to_string(),
            ..GatewayConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.violations.len(), 4);
        let message = err.to_string();
        assert!(message.contains("host"));
        assert!(message.contains("port"));
        assert!(message.contains("openai_base_url"));
        assert!(message.contains("log_level"));
    }

    #[test]
    fn test_hosts() {
        assert!(is_valid_host("localhost"));
        assert!(is_valid_host("api.internal-1.example"));
        assert!(is_valid_host("127.0.0.1"));
        assert!(is_valid_host("::1"));
        assert!(!is_valid_host(""));
        assert!(!is_valid_host("-leading.example"));
        assert!(!is_valid_host("a..b"));
    }

    #[test]
    fn test_ipv6_bind_addr() {
        let config = GatewayConfig {
            host: "::".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(config.bind_addr(), "[::]:11434");
    }

    #[test]
    fn test_relative_base_url_rejected() {
        let config = GatewayConfig {
            openai_base_url: "/v1".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err().violations,
            vec![ConfigViolation::InvalidBaseUrl("/v1".to_string())]
        );
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_timeout("90").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_timeout("2.5").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_timeout("0").unwrap(), Duration::ZERO);
        assert!(matches!(
            parse_timeout("-1s"),
            Err(TimeoutParseError::Negative(_))
        ));
        assert!(matches!(
            parse_timeout("-3"),
            Err(TimeoutParseError::Negative(_))
        ));
        assert!(matches!(
            parse_timeout("soon"),
            Err(TimeoutParseError::Duration(_))
        ));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = GatewayConfig {
            timeout: Duration::ZERO,
            ..GatewayConfig::default()
        };
        assert_eq!(config.upstream_timeout(), None);
    }
}
