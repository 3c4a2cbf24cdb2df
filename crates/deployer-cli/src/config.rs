//! Deployer configuration
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. the TOML file (`--config`, or `deployer.toml` when present)
//! 3. `DEPLOYER_BASE_URL` / `DEPLOYER_STATUS_URL`
//! 4. command-line flags

use crate::error::ConfigError;
use deployer_client::{ClientConfig, ClientError};
use deployer_validation::CoordinatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "deployer.toml";

/// Environment variable overriding `base_url`
pub const ENV_BASE_URL: &str = "DEPLOYER_BASE_URL";

/// Environment variable overriding `status_url`
pub const ENV_STATUS_URL: &str = "DEPLOYER_STATUS_URL";

/// Deployer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployerConfig {
    /// Backend base url
    pub base_url: String,
    /// Push channel base url, defaults to `base_url`
    pub status_url: Option<String>,
    /// Quiet period before a field is validated
    pub debounce_ms: u64,
    /// Lifetime of transient alerts
    pub notification_ttl_ms: u64,
    /// Pause between simulated deployment stages
    pub progress_step_ms: u64,
    /// HTTP request timeout
    pub request_timeout_secs: u64,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            base_url: deployer_client::DEFAULT_BASE_URL.to_string(),
            status_url: None,
            debounce_ms: 300,
            notification_ttl_ms: 5_000,
            progress_step_ms: 1_500,
            request_timeout_secs: deployer_client::DEFAULT_TIMEOUT.as_secs(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl DeployerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` if it is not valid config TOML
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` if it is not valid config TOML
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Load from an explicit file, or from `deployer.toml` if it exists
    ///
    /// # Errors
    /// - as [`from_file`](Self::from_file); a missing default file is not an error
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply environment overrides read through `lookup`
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(url) = lookup(ENV_STATUS_URL).filter(|v| !v.is_empty()) {
            self.status_url = Some(url);
        }
        self
    }

    /// With base url
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// With log level
    #[inline]
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// With JSON logs
    #[inline]
    #[must_use]
    pub fn with_log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }

    /// With debounce
    #[inline]
    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Debounce as a duration
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Alert lifetime as a duration
    #[must_use]
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    /// Stage interval as a duration
    #[must_use]
    pub fn progress_step(&self) -> Duration {
        Duration::from_millis(self.progress_step_ms)
    }

    /// Request timeout as a duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// HTTP client settings
    ///
    /// # Errors
    /// - `ClientError` if `base_url` is not an http(s) url
    pub fn client_config(&self) -> Result<ClientConfig, ClientError> {
        Ok(ClientConfig::new(&self.base_url)?.with_timeout(self.request_timeout()))
    }

    /// Coordinator settings
    #[must_use]
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig::new().with_debounce(self.debounce())
    }

    /// Base url of the push channel
    ///
    /// # Errors
    /// - `ConfigError::Invalid` if the url does not parse
    pub fn status_base(&self) -> Result<Url, ConfigError> {
        let raw = self.status_url.as_deref().unwrap_or(&self.base_url);
        Url::parse(raw).map_err(|e| ConfigError::Invalid(format!("status url '{raw}': {e}")))
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
