//! Link-state routing node for lsr.
//!
//! [`LinkStateRouter`] owns one node's link table, link-state database,
//! sequence number and forwarding table, and reacts to four kinds of events:
//! packets, link up, link down and clock ticks. Anything it sends goes
//! through a [`Transport`]. [`MemoryNetwork`] wires many routers together
//! for tests and the `lsr` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod flooding;
pub mod memory;
pub mod router;
pub mod stats;
pub mod transport;

// Re-export main types
pub use config::{ConfigError, RouterConfig, DEFAULT_HEARTBEAT_INTERVAL_MS};
pub use flooding::FloodingEngine;
pub use memory::{MemoryNetwork, NetworkConfig, NetworkError, Trace, TraceOutcome};
pub use router::{Disposition, LinkStateRouter};
pub use stats::NodeStats;
pub use transport::Transport;
