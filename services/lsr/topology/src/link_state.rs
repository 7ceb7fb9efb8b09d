//! Link-state database types.

use lsr_wire::{Address, LinkSet, LinkStateAdvertisement, SequenceNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Most recent advertisement accepted from one origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStateRecord {
    /// Node that advertised these links
    pub origin: Address,
    /// Sequence number of the advertisement
    pub sequence_number: SequenceNumber,
    /// Advertised neighbors and costs
    pub links: LinkSet,
}

impl From<&LinkStateAdvertisement> for LinkStateRecord {
    fn from(lsa: &LinkStateAdvertisement) -> Self {
        Self {
            origin: lsa.origin.clone(),
            sequence_number: lsa.sequence_number,
            links: lsa.links.clone(),
        }
    }
}

/// Why an advertisement was not stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Older than the stored record
    Stale,
    /// Same sequence as the stored record
    Duplicate,
    /// Claims to come from the local node
    SelfOriginated,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Stale => write!(f, "stale sequence number"),
            RejectReason::Duplicate => write!(f, "duplicate sequence number"),
            RejectReason::SelfOriginated => write!(f, "self-originated advertisement"),
        }
    }
}

/// Result of offering an advertisement to the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Record replaced; recompute routes and relay
    Accepted,
    /// Record untouched; do not relay
    Rejected(RejectReason),
}

impl IngestOutcome {
    /// Check if the advertisement was stored
    pub fn is_accepted(&self) -> bool {
        matches!(self, IngestOutcome::Accepted)
    }
}

/// Link-state database.
///
/// Records are never removed: an origin that leaves the network keeps its
/// last advertised links until it advertises again.
#[derive(Debug)]
pub struct LinkStateDatabase {
    /// Local node address
    local_address: Address,
    /// Freshest record per origin
    records: BTreeMap<Address, LinkStateRecord>,
}

// Include implementation
mod database;
pub use database::LsdbStats;
