use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Transport error talking to {upstream}: {reason}")]
    Transport { upstream: String, reason: String },

    #[error("Upstream {upstream} returned HTTP {status}")]
    BadUpstreamStatus { upstream: String, status: u16 },

    #[error("Response from {upstream} exceeds {limit} bytes")]
    ResponseTooLarge { upstream: String, limit: usize },

    #[error("Malformed DNS response from {upstream}: {reason}")]
    MalformedResponse { upstream: String, reason: String },

    #[error("No upstream servers configured")]
    NoUpstreams,

    #[error("Query cancelled")]
    Cancelled,

    #[error("Query deadline exceeded")]
    DeadlineExceeded,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// True when the query was stopped by its context rather than by the upstream.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
