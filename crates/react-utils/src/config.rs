//! Application configuration
//!
//! [`AppConfig`] gathers the settings shared by the CLI and the HTTP server.
//! Values come from defaults, then the environment, then (in the CLI)
//! command-line flags.

use crate::LogFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
        /// Parse failure
        reason: String,
    },

    /// The configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model identifier
    pub model: String,

    /// Iteration budget of one run
    pub max_iterations: usize,

    /// Deadline for a single gateway call, in seconds
    pub gateway_timeout_secs: u64,

    /// Server bind host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            max_iterations: 10,
            gateway_timeout_secs: 120,
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Reads `REACT_MODEL`, `REACT_MAX_ITERATIONS`,
    /// `REACT_GATEWAY_TIMEOUT_SECS`, `HOST`, `PORT` and `REACT_LOG_FORMAT`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(model) = lookup("REACT_MODEL") {
            config.model = model;
        }
        if let Some(value) = lookup("REACT_MAX_ITERATIONS") {
            config.max_iterations = parse("REACT_MAX_ITERATIONS", &value)?;
        }
        if let Some(value) = lookup("REACT_GATEWAY_TIMEOUT_SECS") {
            config.gateway_timeout_secs = parse("REACT_GATEWAY_TIMEOUT_SECS", &value)?;
        }
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(value) = lookup("PORT") {
            config.port = parse("PORT", &value)?;
        }
        if let Some(value) = lookup("REACT_LOG_FORMAT") {
            config.log_format = parse("REACT_LOG_FORMAT", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        Ok(())
    }

    /// Gateway deadline, `None` when disabled with 0
    pub fn gateway_timeout(&self) -> Option<Duration> {
        (self.gateway_timeout_secs > 0).then(|| Duration::from_secs(self.gateway_timeout_secs))
    }

    /// `host:port` to bind the server to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.gateway_timeout(), Some(Duration::from_secs(120)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("REACT_MODEL", "gemini-2.5-pro"),
            ("REACT_MAX_ITERATIONS", "4"),
            ("PORT", "8080"),
            ("REACT_LOG_FORMAT", "json"),
            ("REACT_GATEWAY_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.gateway_timeout(), None);
    }

    #[test]
    fn test_bad_number_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("REACT_MAX_ITERATIONS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_empty_model_rejected() {
        let config = AppConfig {
            model: "  ".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AppConfig =
            serde_json::from_str(r#"{"max_iterations": 3, "log_format": "json"}"#).unwrap();
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.model, "gemini-2.5-flash");
    }
}
