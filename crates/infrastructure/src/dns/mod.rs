pub mod events;
pub mod forwarding;
pub mod load_balancer;
pub mod transport;

pub use events::{UpstreamEvent, UpstreamEventEmitter, UpstreamMetrics};
pub use forwarding::{MessageBuilder, ResponseParser};
pub use load_balancer::{HealthTrackedClient, LoadBalancedClient, Policy, SelectionPolicy};
pub use transport::DohClient;
