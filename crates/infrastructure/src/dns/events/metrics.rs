use super::UpstreamEvent;
use dashmap::DashMap;
use ferrous_doh_application::ports::UpstreamMetricsPort;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationStats {
    pub count: u64,
    pub total: Duration,
    pub max: Duration,
}

impl DurationStats {
    fn observe(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total = self.total.saturating_add(elapsed);
        self.max = self.max.max(elapsed);
    }

    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        self.total / u32::try_from(self.count).unwrap_or(u32::MAX)
    }
}

/// In-process aggregation of upstream observations.
///
/// Cheap to clone; clones share the same counters.
#[derive(Clone, Default)]
pub struct UpstreamMetrics {
    requests: Arc<DashMap<Arc<str>, u64>>,

    response_codes: Arc<DashMap<(Arc<str>, Arc<str>), u64>>,

    durations: Arc<DashMap<Arc<str>, DurationStats>>,

    healthcheck_broken: Arc<AtomicU64>,
}

impl UpstreamMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, event: &UpstreamEvent) {
        match event {
            UpstreamEvent::Request { upstream } => self.record_request(upstream),
            UpstreamEvent::ResponseCode { upstream, rcode } => {
                *self
                    .response_codes
                    .entry((Arc::clone(upstream), Arc::clone(rcode)))
                    .or_insert(0) += 1;
            }
            UpstreamEvent::Duration { upstream, elapsed } => {
                self.observe_duration(upstream, *elapsed)
            }
            UpstreamEvent::HealthcheckBroken => self.record_healthcheck_broken(),
        }
    }

    /// Drain an emitter's channel into this aggregator until every sender is gone.
    pub fn spawn_collector(&self, mut rx: mpsc::UnboundedReceiver<UpstreamEvent>) -> JoinHandle<()> {
        let metrics = self.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                metrics.track(&event);
            }
            debug!("Upstream metrics collector stopped");
        })
    }

    pub fn request_count(&self, upstream: &str) -> u64 {
        self.requests.get(upstream).map(|v| *v).unwrap_or(0)
    }

    pub fn response_code_count(&self, upstream: &str, rcode: &str) -> u64 {
        self.response_codes
            .get(&(Arc::from(upstream), Arc::from(rcode)))
            .map(|v| *v)
            .unwrap_or(0)
    }

    pub fn duration_stats(&self, upstream: &str) -> DurationStats {
        self.durations.get(upstream).map(|v| *v).unwrap_or_default()
    }

    pub fn healthcheck_broken_count(&self) -> u64 {
        self.healthcheck_broken.load(Ordering::Relaxed)
    }

    pub fn upstreams(&self) -> Vec<String> {
        let mut upstreams: Vec<String> = self
            .requests
            .iter()
            .map(|entry| entry.key().to_string())
            .collect();
        upstreams.sort();
        upstreams
    }

    pub fn reset(&self) {
        self.requests.clear();
        self.response_codes.clear();
        self.durations.clear();
        self.healthcheck_broken.store(0, Ordering::Relaxed);
    }
}

impl UpstreamMetricsPort for UpstreamMetrics {
    fn record_request(&self, upstream: &str) {
        if let Some(mut count) = self.requests.get_mut(upstream) {
            *count += 1;
            return;
        }
        *self.requests.entry(Arc::from(upstream)).or_insert(0) += 1;
    }

    fn record_response_code(&self, upstream: &str, rcode: &str) {
        *self
            .response_codes
            .entry((Arc::from(upstream), Arc::from(rcode)))
            .or_insert(0) += 1;
    }

    fn observe_duration(&self, upstream: &str, elapsed: Duration) {
        if let Some(mut stats) = self.durations.get_mut(upstream) {
            stats.observe(elapsed);
            return;
        }
        self.durations
            .entry(Arc::from(upstream))
            .or_default()
            .observe(elapsed);
    }

    fn record_healthcheck_broken(&self) {
        self.healthcheck_broken.fetch_add(1, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for UpstreamMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamMetrics")
            .field("upstreams", &self.requests.len())
            .field("healthcheck_broken", &self.healthcheck_broken_count())
            .finish()
    }
}
