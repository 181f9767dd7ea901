use std::sync::Arc;
use std::time::Duration;

/// One observation emitted from the upstream query path.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamEvent {
    Request {
        upstream: Arc<str>,
    },

    ResponseCode {
        upstream: Arc<str>,
        rcode: Arc<str>,
    },

    Duration {
        upstream: Arc<str>,
        elapsed: Duration,
    },

    /// All upstreams were down and the first one was queried anyway.
    HealthcheckBroken,
}

impl UpstreamEvent {
    pub fn upstream(&self) -> Option<&str> {
        match self {
            Self::Request { upstream }
            | Self::ResponseCode { upstream, .. }
            | Self::Duration { upstream, .. } => Some(upstream.as_ref()),
            Self::HealthcheckBroken => None,
        }
    }
}
