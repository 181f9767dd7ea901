use async_trait::async_trait;
use ferrous_doh_application::ports::DnsClient;
use ferrous_doh_application::QueryContext;
use ferrous_doh_domain::DomainError;
use hickory_proto::op::{Message, MessageType, OpCode};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fake upstream whose outcome is set by the test.
///
/// Errors carry the client's name so tests can tell which upstream failed last.
pub struct ScriptedClient {
    name: &'static str,
    fail: AtomicBool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn ok(name: &'static str) -> Arc<Self> {
        Self::build(name, false, None)
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Self::build(name, true, None)
    }

    /// Answers successfully, but only after `delay`.
    pub fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
        Self::build(name, false, Some(delay))
    }

    fn build(name: &'static str, fail: bool, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: AtomicBool::new(fail),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn error(name: &str) -> DomainError {
        DomainError::Transport {
            upstream: name.to_string(),
            reason: "scripted failure".to_string(),
        }
    }
}

#[async_trait]
impl DnsClient for ScriptedClient {
    async fn query(&self, ctx: &QueryContext, _request: &[u8]) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ctx.run(async {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                Err(Self::error(self.name))
            } else {
                Ok(Message::new(42, MessageType::Response, OpCode::Query))
            }
        })
        .await
    }
}
