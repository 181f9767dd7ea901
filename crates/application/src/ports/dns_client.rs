use crate::context::QueryContext;
use async_trait::async_trait;
use ferrous_doh_domain::DomainError;
use hickory_proto::op::Message;
use std::sync::Arc;

/// Sends one raw DNS query and returns the decoded answer.
///
/// The wire client, the health-tracked client and the load-balanced client all
/// implement this, so each layer can wrap the one below it (or a fake of it).
#[async_trait]
pub trait DnsClient: Send + Sync {
    async fn query(&self, ctx: &QueryContext, request: &[u8]) -> Result<Message, DomainError>;
}

#[async_trait]
impl<T: DnsClient + ?Sized> DnsClient for Arc<T> {
    async fn query(&self, ctx: &QueryContext, request: &[u8]) -> Result<Message, DomainError> {
        (**self).query(ctx, request).await
    }
}
