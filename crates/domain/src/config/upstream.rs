use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Upstream DoH resolvers and how queries are spread across them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Full DoH endpoint URLs, e.g. `https://1.1.1.1/dns-query`.
    #[serde(default)]
    pub servers: Vec<String>,

    #[serde(default)]
    pub policy: UpstreamPolicy,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Failures an upstream may accumulate before it is skipped. 0 disables health checking.
    #[serde(default = "default_max_fails")]
    pub max_fails: u32,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "upstream.timeout_ms must be greater than 0".to_string(),
            ));
        }

        for server in &self.servers {
            let lower = server.to_ascii_lowercase();
            if !(lower.starts_with("https://") || lower.starts_with("http://")) {
                return Err(ConfigError::Validation(format!(
                    "Upstream '{}' is not an http:// or https:// URL",
                    server
                )));
            }
        }

        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            policy: UpstreamPolicy::default(),
            timeout_ms: default_timeout_ms(),
            max_fails: default_max_fails(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamPolicy {
    #[default]
    Random,

    RoundRobin,

    Sequential,
}

impl UpstreamPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::RoundRobin => "round_robin",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for UpstreamPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpstreamPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "random" => Ok(Self::Random),
            "round_robin" => Ok(Self::RoundRobin),
            "sequential" => Ok(Self::Sequential),
            _ => Err(ConfigError::Parse(format!(
                "unknown policy '{}', expected random, round_robin or sequential",
                s
            ))),
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_fails() -> u32 {
    2
}
