mod dns_client;
mod upstream_health_port;
mod upstream_metrics_port;

pub use dns_client::DnsClient;
pub use upstream_health_port::{UpstreamHealthPort, UpstreamHealthReport, UpstreamStatus};
pub use upstream_metrics_port::{NoopMetrics, UpstreamMetricsPort};
