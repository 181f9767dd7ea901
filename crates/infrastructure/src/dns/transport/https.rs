//! HTTPS transport for DNS queries: DNS-over-HTTPS (RFC 8484)
//!
//! Sends DNS queries as HTTP POST requests with `application/dns-message` content type.
//! The request body is the raw DNS wire format message, and the response body
//! contains the raw DNS wire format response.
//!
//! Wire format (HTTP):
//! ```text
//! POST /dns-query HTTP/2
//! Content-Type: application/dns-message
//! Accept: application/dns-message
//!
//! <raw DNS message bytes>
//! ```
//!
//! This layer never retries: a failed exchange is reported once and the
//! load balancer decides what to try next.

use async_trait::async_trait;
use ferrous_doh_application::ports::DnsClient;
use ferrous_doh_application::QueryContext;
use ferrous_doh_domain::DomainError;
use hickory_proto::op::Message;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::debug;

/// Shared HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Expected content type for DNS-over-HTTPS messages (RFC 8484 §6)
pub const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// Largest response body accepted from an upstream.
///
/// Ethernet MTU (1500) minus the minimum IPv4 header (20) and the UDP header (8).
pub const MAX_DNS_MESSAGE_SIZE: usize = 1472;

/// DNS-over-HTTPS client for a single upstream (RFC 8484)
#[derive(Clone)]
pub struct DohClient {
    url: Arc<str>,
    client: reqwest::Client,
}

impl DohClient {
    /// Uses the process-wide pooled client.
    pub fn new(url: impl Into<Arc<str>>) -> Self {
        Self::with_client(url, SHARED_CLIENT.clone())
    }

    pub fn with_client(url: impl Into<Arc<str>>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn exchange(&self, request: &[u8]) -> Result<Message, DomainError> {
        debug!(url = %self.url, message_len = request.len(), "Sending DoH query");

        // POST with application/dns-message (RFC 8484 §4.1)
        let response = self
            .client
            .post(&*self.url)
            .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            .header(CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
            .body(request.to_vec())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        // RFC 8484 §4.2.1: only 2xx responses carry a DNS answer, whatever the body holds
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::BadUpstreamStatus {
                upstream: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = read_capped(response, MAX_DNS_MESSAGE_SIZE + 1)
            .await
            .map_err(|e| self.transport_error(e))?;

        debug!(url = %self.url, response_len = body.len(), "DoH response received");

        if body.len() > MAX_DNS_MESSAGE_SIZE {
            return Err(DomainError::ResponseTooLarge {
                upstream: self.url.to_string(),
                limit: MAX_DNS_MESSAGE_SIZE,
            });
        }

        Message::from_vec(&body).map_err(|e| DomainError::MalformedResponse {
            upstream: self.url.to_string(),
            reason: e.to_string(),
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> DomainError {
        DomainError::Transport {
            upstream: self.url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl DnsClient for DohClient {
    async fn query(&self, ctx: &QueryContext, request: &[u8]) -> Result<Message, DomainError> {
        ctx.run(self.exchange(request)).await
    }
}

impl std::fmt::Debug for DohClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DohClient").field("url", &self.url).finish()
    }
}

/// Read at most `limit` bytes of the body, stopping as soon as the limit is hit.
async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::with_capacity(512);
    while let Some(chunk) = response.chunk().await? {
        let remaining = limit - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
        if body.len() >= limit {
            break;
        }
    }
    Ok(body)
}
