pub mod emitter;
pub mod metrics;
pub mod types;

pub use emitter::UpstreamEventEmitter;
pub use metrics::{DurationStats, UpstreamMetrics};
pub use types::UpstreamEvent;
