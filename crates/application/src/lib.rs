//! Ferrous DoH Application Layer
//!
//! Ports shared by every layer of the upstream client stack, plus the
//! cancellable [`QueryContext`] that bounds each query.
pub mod context;
pub mod ports;

pub use context::QueryContext;
