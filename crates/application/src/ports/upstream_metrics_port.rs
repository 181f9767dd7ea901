use std::time::Duration;

/// Sink for per-upstream observations.
///
/// Implementations must not block: calls happen on the query path.
pub trait UpstreamMetricsPort: Send + Sync {
    fn record_request(&self, upstream: &str);

    fn record_response_code(&self, upstream: &str, rcode: &str);

    fn observe_duration(&self, upstream: &str, elapsed: Duration);

    /// Every upstream was down and one was queried anyway.
    fn record_healthcheck_broken(&self);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl UpstreamMetricsPort for NoopMetrics {
    fn record_request(&self, _upstream: &str) {}

    fn record_response_code(&self, _upstream: &str, _rcode: &str) {}

    fn observe_duration(&self, _upstream: &str, _elapsed: Duration) {}

    fn record_healthcheck_broken(&self) {}
}
