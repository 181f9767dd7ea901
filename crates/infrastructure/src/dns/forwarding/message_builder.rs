//! DNS Message Builder
//!
//! Constructs DNS query messages in wire format using `hickory-proto`.
//! The upstream stack forwards raw bytes untouched; this is only needed by
//! callers that start from a domain name instead of a client's packet.

use ferrous_doh_domain::DomainError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Builds DNS query messages in wire format
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a recursive query (random ID, RD set, one question) and serialize it.
    pub fn build_query(domain: &str, record_type: RecordType) -> Result<Vec<u8>, DomainError> {
        let name = Name::from_str(domain).map_err(|e| {
            DomainError::InvalidQuery(format!("Invalid domain '{}': {}", domain, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(record_type);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        Self::serialize_message(&message)
    }

    /// Accepts mnemonics in any case, e.g. `aaaa`.
    pub fn parse_record_type(value: &str) -> Result<RecordType, DomainError> {
        RecordType::from_str(&value.to_ascii_uppercase())
            .map_err(|e| DomainError::InvalidQuery(format!("Invalid record type '{}': {}", value, e)))
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::InvalidQuery(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
