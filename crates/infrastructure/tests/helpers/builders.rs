use super::ScriptedClient;
use ferrous_doh_application::ports::{DnsClient, UpstreamMetricsPort};
use ferrous_doh_infrastructure::dns::forwarding::MessageBuilder;
use ferrous_doh_infrastructure::dns::load_balancer::{HealthTrackedClient, LoadBalancedClient};
use hickory_proto::rr::RecordType;
use std::sync::Arc;

/// Hand-assembled DNS wire messages.
pub struct WireBuilder;

impl WireBuilder {
    pub fn example_query() -> Vec<u8> {
        MessageBuilder::build_query("example.com", RecordType::A).unwrap()
    }

    /// Answer `query` with one A record (TTL 60). The query must carry only a question.
    pub fn a_response(query: &[u8], ip: [u8; 4]) -> Vec<u8> {
        let mut response = Self::header(query, 0x80, 1);
        response.extend_from_slice(&query[12..]);
        response.extend_from_slice(&[
            0xc0, 0x0c, // pointer to the question name
            0x00, 0x01, // TYPE A
            0x00, 0x01, // CLASS IN
            0x00, 0x00, 0x00, 0x3c, // TTL 60
            0x00, 0x04, // RDLENGTH
        ]);
        response.extend_from_slice(&ip);
        response
    }

    pub fn servfail_response(query: &[u8]) -> Vec<u8> {
        let mut response = Self::header(query, 0x82, 0);
        response.extend_from_slice(&query[12..]);
        response
    }

    fn header(query: &[u8], flags_low: u8, ancount: u16) -> Vec<u8> {
        let mut response = Vec::with_capacity(512);
        response.extend_from_slice(&query[0..2]);
        response.push(0x81); // QR + RD
        response.push(flags_low); // RA + RCODE
        response.extend_from_slice(&query[4..6]);
        response.extend_from_slice(&ancount.to_be_bytes());
        response.extend_from_slice(&[0x00, 0x00]);
        response.extend_from_slice(&[0x00, 0x00]);
        response
    }
}

pub struct PoolBuilder;

impl PoolBuilder {
    /// One health-tracked upstream per scripted client, labelled with the client's name.
    pub fn tracked(
        clients: &[Arc<ScriptedClient>],
        metrics: Arc<dyn UpstreamMetricsPort>,
    ) -> Vec<Arc<HealthTrackedClient>> {
        clients
            .iter()
            .map(|c| {
                let inner: Arc<dyn DnsClient> = c.clone();
                Arc::new(HealthTrackedClient::new(c.name(), inner, Arc::clone(&metrics)))
            })
            .collect()
    }

    pub fn balanced(
        clients: &[Arc<ScriptedClient>],
        metrics: Arc<dyn UpstreamMetricsPort>,
    ) -> LoadBalancedClient {
        LoadBalancedClient::new(Self::tracked(clients, Arc::clone(&metrics)), metrics)
    }
}
