mod errors;
mod logging;
mod root;
mod upstream;

pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use upstream::{UpstreamConfig, UpstreamPolicy};
