#![allow(dead_code)]
mod builders;
mod doh_server_mock;
mod mock_clients;

pub use builders::{PoolBuilder, WireBuilder};
pub use doh_server_mock::{MockBehavior, MockDohServer, RecordedRequest};
pub use mock_clients::ScriptedClient;
