//! Configuration management for building a validator

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::oidc::discovery::HTTP_TIMEOUT_SECS;
use crate::oidc::{TokenValidator, ValidationError};

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Identity provider name, e.g. `google`
    pub provider: String,

    /// OAuth client ID; empty disables the audience check
    #[serde(default)]
    pub client_id: String,

    /// Overall timeout for discovery while building a validator
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_http_timeout_secs() -> u64 {
    HTTP_TIMEOUT_SECS
}

impl Config {
    pub fn new(provider: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            client_id: client_id.into(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_env_or_default()?;
        if config.provider.is_empty() {
            return Err(ConfigError::MissingEnvVar("OIDC_PROVIDER".to_string()));
        }
        Ok(config)
    }

    /// Like [`Config::from_env`], but an unset `OIDC_PROVIDER` leaves the
    /// provider empty so a caller can fill it in afterwards.
    pub fn from_env_or_default() -> Result<Self, ConfigError> {
        let provider = std::env::var("OIDC_PROVIDER").unwrap_or_default();
        let client_id = std::env::var("OIDC_CLIENT_ID").unwrap_or_default();

        let http_timeout_secs = match std::env::var("OIDC_HTTP_TIMEOUT_SECS") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("OIDC_HTTP_TIMEOUT_SECS".to_string(), v))?,
            Err(_) => default_http_timeout_secs(),
        };

        Ok(Self {
            provider,
            client_id,
            http_timeout_secs,
        })
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("~/.config"));
        config_dir.join("oidc-id-token").join("config.yaml")
    }

    /// Load from default locations (file first, then env)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path();

        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            Self::from_env()
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Fetch the provider's keys and build a validator.
    pub fn build_validator(&self) -> Result<TokenValidator, ValidationError> {
        TokenValidator::build_with_timeout(&self.provider, &self.client_id, self.http_timeout())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
