pub mod https;

pub use https::{DohClient, DNS_MESSAGE_CONTENT_TYPE, MAX_DNS_MESSAGE_SIZE};
