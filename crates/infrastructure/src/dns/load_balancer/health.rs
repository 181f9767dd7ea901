use crate::dns::forwarding::ResponseParser;
use async_trait::async_trait;
use ferrous_doh_application::ports::{DnsClient, UpstreamMetricsPort, UpstreamStatus};
use ferrous_doh_application::QueryContext;
use ferrous_doh_domain::DomainError;
use hickory_proto::op::Message;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Wraps one upstream's client with a failure counter and success metrics.
///
/// The counter is reset by any success and bumped by any failure; it never
/// wraps, so a long outage cannot roll it back to a healthy-looking zero.
pub struct HealthTrackedClient {
    label: Arc<str>,
    client: Arc<dyn DnsClient>,
    failures: AtomicU32,
    metrics: Arc<dyn UpstreamMetricsPort>,
}

impl HealthTrackedClient {
    pub fn new(
        label: impl Into<Arc<str>>,
        client: Arc<dyn DnsClient>,
        metrics: Arc<dyn UpstreamMetricsPort>,
    ) -> Self {
        Self {
            label: label.into(),
            client,
            failures: AtomicU32::new(0),
            metrics,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn failure_count(&self) -> u32 {
        self.failures.load(Ordering::Acquire)
    }

    /// `max_fails == 0` disables health checking. Otherwise the upstream is
    /// down once its failures strictly exceed `max_fails`.
    pub fn is_down(&self, max_fails: u32) -> bool {
        if max_fails == 0 {
            return false;
        }
        self.failure_count() > max_fails
    }

    pub fn status(&self, max_fails: u32) -> UpstreamStatus {
        if max_fails == 0 {
            UpstreamStatus::Unchecked
        } else if self.is_down(max_fails) {
            UpstreamStatus::Unhealthy
        } else {
            UpstreamStatus::Healthy
        }
    }

    fn record_failure(&self) {
        // Err means the counter is already at u32::MAX; leave it there.
        let _ = self
            .failures
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1));
    }

    fn record_success(&self) {
        let previous = self.failures.swap(0, Ordering::AcqRel);
        if previous > 0 {
            info!(upstream = %self.label, previous_failures = previous, "Upstream recovered");
        }
    }

    #[cfg(test)]
    fn set_failure_count(&self, value: u32) {
        self.failures.store(value, Ordering::Release);
    }
}

#[async_trait]
impl DnsClient for HealthTrackedClient {
    async fn query(&self, ctx: &QueryContext, request: &[u8]) -> Result<Message, DomainError> {
        let start = Instant::now();

        match self.client.query(ctx, request).await {
            Ok(message) => {
                self.record_success();

                let rcode = ResponseParser::rcode_label(message.response_code());
                let elapsed = start.elapsed();
                self.metrics.record_request(&self.label);
                self.metrics.record_response_code(&self.label, &rcode);
                self.metrics.observe_duration(&self.label, elapsed);

                debug!(
                    upstream = %self.label,
                    rcode = %rcode,
                    latency_ms = elapsed.as_millis() as u64,
                    "Upstream responded"
                );
                Ok(message)
            }
            Err(e) => {
                self.record_failure();
                debug!(
                    upstream = %self.label,
                    failures = self.failure_count(),
                    error = %e,
                    "Upstream query failed"
                );
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for HealthTrackedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthTrackedClient")
            .field("label", &self.label)
            .field("failures", &self.failure_count())
            .finish()
    }
}
