pub mod health;
pub mod policy;
pub mod pool;

pub use health::HealthTrackedClient;
pub use policy::{Policy, RandomPolicy, RoundRobinPolicy, SelectionPolicy, SequentialPolicy};
pub use pool::{LoadBalancedClient, DEFAULT_MAX_FAILS, DEFAULT_REQUEST_TIMEOUT};
