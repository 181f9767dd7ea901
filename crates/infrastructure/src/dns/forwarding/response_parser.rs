use hickory_proto::op::{Message, ResponseCode};
use serde::Serialize;
use std::borrow::Cow;

/// Printable view of a decoded upstream answer.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseSummary {
    pub id: u16,
    pub rcode: String,
    pub truncated: bool,
    pub answers: Vec<String>,
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn summarize(message: &Message) -> ResponseSummary {
        ResponseSummary {
            id: message.id(),
            rcode: Self::rcode_label(message.response_code()).into_owned(),
            truncated: message.truncated(),
            answers: message.answers().iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Mnemonic used as the metrics label; unnamed codes fall back to their number.
    pub fn rcode_label(rcode: ResponseCode) -> Cow<'static, str> {
        let name = match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::YXDomain => "YXDOMAIN",
            ResponseCode::YXRRSet => "YXRRSET",
            ResponseCode::NXRRSet => "NXRRSET",
            ResponseCode::NotAuth => "NOTAUTH",
            ResponseCode::NotZone => "NOTZONE",
            other => return Cow::Owned(u16::from(other).to_string()),
        };
        Cow::Borrowed(name)
    }
}
