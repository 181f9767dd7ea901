pub mod query;
pub mod upstreams;
