//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. The
//! configuration is read from a TOML file; credentials only ever come from
//! the environment (`RIGGER_TOKEN` or `RIGGER_PASSWORD`).
//!
//! # Example
//!
//! ```no_run
//! use rigger::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("rigger.toml")?;
//!     config.init_logging(None);
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::deploy::DeployConfig;
use super::logging::LoggingConfig;
use super::manifest::ManifestConfig;
use super::platform::PlatformConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Control API connection.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Manifest repository.
    #[serde(default)]
    pub manifests: ManifestConfig,

    /// Retry and build-polling behavior.
    #[serde(default)]
    pub deploy: DeployConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.platform.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults, so a run configured purely through
    /// the environment works without one.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Self::parse_toml("");
        }
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self, level_override: Option<&str>) {
        self.logging.init(level_override);
    }

    /// Check that values are within acceptable ranges.
    ///
    /// The platform URL may be empty here; commands that talk to the
    /// platform check it via [`Config::require_platform_url`].
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if !self.platform.url.is_empty() {
            url::Url::parse(&self.platform.url).map_err(|err| ConfigError::InvalidValue {
                field: "platform.url",
                reason: err.to_string(),
            })?;
        }
        if self.platform.namespace.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "platform.namespace",
            }
            .into());
        }
        if self.platform.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "platform.timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.manifests.base_url.trim().is_empty() && self.manifests.directory.is_none() {
            return Err(ConfigError::MissingField {
                field: "manifests.base_url",
            }
            .into());
        }
        if self.deploy.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "deploy.retry_max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.deploy.build_max_polls == 0 {
            return Err(ConfigError::InvalidValue {
                field: "deploy.build_max_polls",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.deploy.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "deploy.timeout_secs",
                reason: "must be greater than 0 when set".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Fail unless a platform URL is configured.
    #[allow(clippy::result_large_err)]
    pub fn require_platform_url(&self) -> Result<&str> {
        if self.platform.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "platform.url",
            }
            .into());
        }
        Ok(self.platform.base_url())
    }

    /// Render the effective configuration as TOML. Credentials are omitted.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| crate::error::Error::Other(err.to_string()))
    }
}
