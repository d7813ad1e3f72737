//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use finbuddy_core::LifeStage;
use reqwest::Url;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: Url,
    pub log_level: Level,
    pub request_timeout: Duration,
    pub initial_stage: Option<LifeStage>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Remote Service ---
        let base_url_str = lookup("FINBUDDY_BASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("FINBUDDY_BASE_URL".to_string()))?;
        let base_url = Url::parse(base_url_str.trim()).map_err(|e| {
            ConfigError::InvalidValue("FINBUDDY_BASE_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue(
                "FINBUDDY_BASE_URL".to_string(),
                format!("'{}' is not an http(s) base URL", base_url_str),
            ));
        }

        let timeout_str = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "30".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "timeout must be at least one second".to_string(),
            ));
        }

        // --- Logging ---
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Startup Behaviour ---
        let initial_stage = lookup("FINBUDDY_STAGE")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.parse::<LifeStage>().map_err(|e| {
                    ConfigError::InvalidValue("FINBUDDY_STAGE".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            base_url,
            log_level,
            request_timeout: Duration::from_secs(timeout_secs),
            initial_stage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_base_url_is_set() {
        let config = load(&[("FINBUDDY_BASE_URL", "http://localhost:8001/api/")]).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8001/api/");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.initial_stage, None);
    }

    #[test]
    fn base_url_is_required() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingVar(v)) if v == "FINBUDDY_BASE_URL"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(matches!(
            load(&[("FINBUDDY_BASE_URL", "localhost:8001")]),
            Err(ConfigError::InvalidValue(..))
        ));
    }

    #[test]
    fn parses_optional_settings() {
        let config = load(&[
            ("FINBUDDY_BASE_URL", "https://finbuddy.example/api"),
            ("RUST_LOG", "debug"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("FINBUDDY_STAGE", "early_career"),
        ])
        .unwrap();
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.initial_stage, Some(LifeStage::EarlyCareer));
    }

    #[test]
    fn rejects_bad_values() {
        let base = ("FINBUDDY_BASE_URL", "http://localhost");
        assert!(load(&[base, ("REQUEST_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[base, ("REQUEST_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[base, ("RUST_LOG", "chatty")]).is_err());
        assert!(load(&[base, ("FINBUDDY_STAGE", "toddler")]).is_err());
    }
}
