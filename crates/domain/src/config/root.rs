use serde::{Deserialize, Serialize};
use tracing::warn;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::upstream::{UpstreamConfig, UpstreamPolicy};

/// Main configuration structure for Ferrous DoH
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Upstream resolvers, selection policy and health threshold
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-doh.toml in current directory
    /// 3. /etc/ferrous-doh/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-doh.toml").exists() {
            Self::from_file("ferrous-doh.toml")?
        } else if std::path::Path::new("/etc/ferrous-doh/config.toml").exists() {
            Self::from_file("/etc/ferrous-doh/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if !overrides.upstreams.is_empty() {
            self.upstream.servers = overrides.upstreams;
        }
        if let Some(policy) = overrides.policy {
            self.upstream.policy = policy;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.upstream.timeout_ms = timeout_ms;
        }
        if let Some(max_fails) = overrides.max_fails {
            self.upstream.max_fails = max_fails;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.upstream.validate()?;

        if self.upstream.servers.is_empty() {
            warn!("No upstream servers configured, every query will fail");
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub upstreams: Vec<String>,
    pub policy: Option<UpstreamPolicy>,
    pub timeout_ms: Option<u64>,
    pub max_fails: Option<u32>,
    pub log_level: Option<String>,
}
