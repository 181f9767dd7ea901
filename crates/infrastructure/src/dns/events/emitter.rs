use super::UpstreamEvent;
use ferrous_doh_application::ports::UpstreamMetricsPort;
use std::time::Duration;
use tokio::sync::mpsc;

/// Fire-and-forget metrics sink: events go onto an unbounded channel and are
/// aggregated elsewhere, so the query path never waits on the backend.
#[derive(Clone)]
pub struct UpstreamEventEmitter {
    sender: Option<mpsc::UnboundedSender<UpstreamEvent>>,
}

impl UpstreamEventEmitter {
    pub fn new_disabled() -> Self {
        Self { sender: None }
    }

    pub fn new_enabled() -> (Self, mpsc::UnboundedReceiver<UpstreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let emitter = Self { sender: Some(tx) };
        (emitter, rx)
    }

    pub fn emit(&self, event: UpstreamEvent) {
        if let Some(ref tx) = self.sender {
            let _ = tx.send(event);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }
}

impl UpstreamMetricsPort for UpstreamEventEmitter {
    fn record_request(&self, upstream: &str) {
        self.emit(UpstreamEvent::Request {
            upstream: upstream.into(),
        });
    }

    fn record_response_code(&self, upstream: &str, rcode: &str) {
        self.emit(UpstreamEvent::ResponseCode {
            upstream: upstream.into(),
            rcode: rcode.into(),
        });
    }

    fn observe_duration(&self, upstream: &str, elapsed: Duration) {
        self.emit(UpstreamEvent::Duration {
            upstream: upstream.into(),
            elapsed,
        });
    }

    fn record_healthcheck_broken(&self) {
        self.emit(UpstreamEvent::HealthcheckBroken);
    }
}

impl Default for UpstreamEventEmitter {
    fn default() -> Self {
        Self::new_disabled()
    }
}

impl std::fmt::Debug for UpstreamEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamEventEmitter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
