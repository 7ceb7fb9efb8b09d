//! Per-node counters

use serde::{Deserialize, Serialize};

/// Router statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStats {
    /// Advertisements originated by this node
    pub lsa_originated: u64,
    /// Advertisements from other nodes stored in the LSDB
    pub lsa_accepted: u64,
    /// Advertisements ignored as stale, duplicate or self-originated
    pub lsa_rejected: u64,
    /// Routing packets put on links (originated and relayed)
    pub lsa_sent: u64,
    /// Data packets forwarded to a neighbor
    pub data_forwarded: u64,
    /// Data packets addressed to this node
    pub data_delivered: u64,
    /// Data packets dropped for lack of a route
    pub data_dropped: u64,
    /// Frames that failed to decode
    pub malformed_frames: u64,
    /// Shortest-path recomputations
    pub spf_runs: u64,
}

impl NodeStats {
    /// Create zeroed statistics
    pub fn new() -> Self {
        Self::default()
    }
}
