//! Ferrous DoH Domain Layer
pub mod config;
pub mod errors;

pub use config::{
    CliOverrides, Config, ConfigError, LoggingConfig, UpstreamConfig, UpstreamPolicy,
};
pub use errors::DomainError;
