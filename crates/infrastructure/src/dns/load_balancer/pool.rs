use super::health::HealthTrackedClient;
use super::policy::{Policy, SelectionPolicy};
use crate::dns::transport::DohClient;
use async_trait::async_trait;
use ferrous_doh_application::ports::{
    DnsClient, UpstreamHealthPort, UpstreamHealthReport, UpstreamMetricsPort,
};
use ferrous_doh_application::QueryContext;
use ferrous_doh_domain::{DomainError, UpstreamConfig};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub const DEFAULT_MAX_FAILS: u32 = 2;

/// Spreads queries over a fixed list of upstreams.
///
/// The policy decides the order, health decides exclusion: upstreams whose
/// failure count exceeds `max_fails` are skipped, the rest are tried one at a
/// time until one answers. When every upstream is down the first one in the
/// computed order is queried anyway, since the health data may be what's wrong.
pub struct LoadBalancedClient {
    upstreams: Vec<Arc<HealthTrackedClient>>,
    policy: Policy,
    timeout: Duration,
    max_fails: u32,
    metrics: Arc<dyn UpstreamMetricsPort>,
}

impl LoadBalancedClient {
    pub fn new(
        upstreams: Vec<Arc<HealthTrackedClient>>,
        metrics: Arc<dyn UpstreamMetricsPort>,
    ) -> Self {
        Self {
            upstreams,
            policy: Policy::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_fails: DEFAULT_MAX_FAILS,
            metrics,
        }
    }

    /// One pooled [`DohClient`] per configured URL, labelled by that URL.
    pub fn from_config(
        config: &UpstreamConfig,
        metrics: Arc<dyn UpstreamMetricsPort>,
    ) -> Result<Self, DomainError> {
        let upstreams = config
            .servers
            .iter()
            .map(|url| {
                reqwest::Url::parse(url)
                    .map_err(|e| DomainError::Config(format!("Invalid upstream '{}': {}", url, e)))?;
                let client: Arc<dyn DnsClient> = Arc::new(DohClient::new(url.as_str()));
                Ok(Arc::new(HealthTrackedClient::new(
                    url.as_str(),
                    client,
                    Arc::clone(&metrics),
                )))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        info!(
            upstreams = upstreams.len(),
            policy = config.policy.as_str(),
            timeout_ms = config.timeout_ms,
            max_fails = config.max_fails,
            "Upstream pool configured"
        );

        Ok(Self::new(upstreams, metrics)
            .with_policy(config.policy.into())
            .with_timeout(config.timeout())
            .with_max_fails(config.max_fails))
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_fails(mut self, max_fails: u32) -> Self {
        self.max_fails = max_fails;
        self
    }

    pub fn upstreams(&self) -> &[Arc<HealthTrackedClient>] {
        &self.upstreams
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_fails(&self) -> u32 {
        self.max_fails
    }

    async fn attempt(
        &self,
        ctx: &QueryContext,
        request: &[u8],
        index: usize,
    ) -> Result<Message, DomainError> {
        let attempt_ctx = ctx.child_with_timeout(self.timeout);
        self.upstreams[index].query(&attempt_ctx, request).await
    }
}

#[async_trait]
impl DnsClient for LoadBalancedClient {
    async fn query(&self, ctx: &QueryContext, request: &[u8]) -> Result<Message, DomainError> {
        let order = self.policy.list(self.upstreams.len());
        let Some(&first) = order.first() else {
            return Err(DomainError::NoUpstreams);
        };

        let mut attempts = 0usize;
        let mut last_error = None;

        for (position, &index) in order.iter().enumerate() {
            let upstream = &self.upstreams[index];
            if upstream.is_down(self.max_fails) {
                debug!(
                    upstream = %upstream.label(),
                    failures = upstream.failure_count(),
                    "Skipping upstream marked down"
                );
                continue;
            }

            ctx.check()?;
            attempts += 1;

            match self.attempt(ctx, request, index).await {
                Ok(message) => return Ok(message),
                Err(e) => {
                    ctx.check()?;
                    warn!(upstream = %upstream.label(), error = %e, position, "Failing over");
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            warn!(attempts, policy = self.policy.name(), error = %e, "All attempted upstreams failed");
            return Err(e);
        }

        ctx.check()?;
        self.metrics.record_healthcheck_broken();
        warn!(
            upstream = %self.upstreams[first].label(),
            upstreams = self.upstreams.len(),
            "All upstreams are down, forcing query to first in order"
        );
        self.attempt(ctx, request, first).await
    }
}

impl UpstreamHealthPort for LoadBalancedClient {
    fn upstream_health(&self) -> Vec<UpstreamHealthReport> {
        self.upstreams
            .iter()
            .map(|upstream| UpstreamHealthReport {
                upstream: upstream.label().to_string(),
                status: upstream.status(self.max_fails),
                failures: upstream.failure_count(),
            })
            .collect()
    }
}

impl std::fmt::Debug for LoadBalancedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBalancedClient")
            .field("upstreams", &self.upstreams)
            .field("policy", &self.policy.name())
            .field("timeout", &self.timeout)
            .field("max_fails", &self.max_fails)
            .finish()
    }
}
