use ferrous_doh_application::ports::UpstreamMetricsPort;
use ferrous_doh_domain::Config;
use ferrous_doh_infrastructure::dns::{LoadBalancedClient, UpstreamEventEmitter, UpstreamMetrics};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

pub struct DohServices {
    pub client: Arc<LoadBalancedClient>,
    pub metrics: UpstreamMetrics,
    pub collector: JoinHandle<()>,
}

impl DohServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let metrics = UpstreamMetrics::new();
        let (emitter, rx) = UpstreamEventEmitter::new_enabled();
        let collector = metrics.spawn_collector(rx);

        let sink: Arc<dyn UpstreamMetricsPort> = Arc::new(emitter);
        let client = LoadBalancedClient::from_config(&config.upstream, sink)?;

        info!(
            upstreams = client.upstreams().len(),
            policy = client.policy_name(),
            "DoH services ready"
        );

        Ok(Self {
            client: Arc::new(client),
            metrics,
            collector,
        })
    }
}
