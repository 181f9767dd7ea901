use thiserror::Error;

/// Failures while loading or checking `ferrous-doh.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Parse(String),

    #[error("Invalid upstream settings: {0}")]
    Validation(String),
}
