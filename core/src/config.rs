//! Client configuration and its loader.
//!
//! Sources are merged lowest to highest priority:
//! 1. built-in defaults
//! 2. an optional `gold-client.toml` (or an explicit path)
//! 3. environment variables prefixed `GOLD_API_`
//!
//! e.g. `GOLD_API_BASE_URL=http://prices.internal/api/v1`,
//! `GOLD_API_TIMEOUT_SECS=30`.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const CONFIG_FILE_NAME: &str = "gold-client";
const ENV_PREFIX: &str = "GOLD_API";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadError(String),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// Transport configuration, fixed once the facade is built.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sent on every request.
    #[serde(default = "default_headers")]
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            default_headers: default_headers(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Load configuration from the default file search path and the environment.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(None)
}

/// Load configuration, reading `config_path` instead of `gold-client.toml`
/// when given. An explicit path must exist; the default file is optional.
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?;

    builder = match config_path {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => builder.add_source(File::with_name(CONFIG_FILE_NAME).required(false)),
    };

    let config: ClientConfig = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?
        .try_deserialize()?;

    config.validate()?;

    tracing::debug!(
        base_url = %config.base_url,
        timeout_secs = config.timeout_secs,
        "Loaded gold client configuration"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use super::*;

    /// Loader tests read process-wide env vars; one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[test]
    fn defaults_match_service_contract() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(
            config.default_headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn builder_overrides_keep_headers() {
        let config = ClientConfig::new("http://example.test/api/v1").with_timeout(3);
        assert_eq!(config.base_url, "http://example.test/api/v1");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.default_headers.len(), 1);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientConfig::default().with_timeout(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn file_overrides_defaults_and_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gold-client.toml");
        std::fs::write(
            &path,
            "base_url = \"http://file.test/api/v1\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let _env = env_guard();
        std::env::remove_var("GOLD_API_BASE_URL");
        std::env::remove_var("GOLD_API_TIMEOUT_SECS");
        let from_file = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(from_file.base_url, "http://file.test/api/v1");
        assert_eq!(from_file.timeout_secs, 5);
        assert_eq!(from_file.default_headers, default_headers());

        std::env::set_var("GOLD_API_BASE_URL", "http://env.test/api/v1");
        std::env::set_var("GOLD_API_TIMEOUT_SECS", "30");
        let from_env = load_config_from_path(Some(&path));
        std::env::remove_var("GOLD_API_BASE_URL");
        std::env::remove_var("GOLD_API_TIMEOUT_SECS");

        let from_env = from_env.unwrap();
        assert_eq!(from_env.base_url, "http://env.test/api/v1");
        assert_eq!(from_env.timeout_secs, 30);
    }

    #[test]
    fn file_with_zero_timeout_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gold-client.toml");
        std::fs::write(&path, "timeout_secs = 0\n").unwrap();

        let _env = env_guard();
        let err = load_config_from_path(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let _env = env_guard();
        let err = load_config_from_path(Some(Path::new("/nonexistent/gold-client.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
