//! LinkStateDatabase implementation methods.

use super::{IngestOutcome, LinkStateDatabase, LinkStateRecord, RejectReason};
use lsr_wire::{Address, LinkSet, LinkStateAdvertisement, SequenceNumber};
use std::collections::BTreeMap;
use tracing::debug;

impl LinkStateDatabase {
    /// Create an empty database for the given local node
    pub fn new(local_address: Address) -> Self {
        Self {
            local_address,
            records: BTreeMap::new(),
        }
    }

    /// Address of the local node
    pub fn local_address(&self) -> &Address {
        &self.local_address
    }

    /// Write the local node's own record
    pub fn install_local(&mut self, sequence_number: SequenceNumber, links: LinkSet) {
        let record = LinkStateRecord {
            origin: self.local_address.clone(),
            sequence_number,
            links,
        };
        self.records.insert(self.local_address.clone(), record);
    }

    /// Offer an advertisement received from a neighbor
    pub fn ingest(&mut self, lsa: &LinkStateAdvertisement) -> IngestOutcome {
        if lsa.origin == self.local_address {
            debug!(
                "Ignoring advertisement claiming our own address {} (seq: {})",
                lsa.origin, lsa.sequence_number
            );
            return IngestOutcome::Rejected(RejectReason::SelfOriginated);
        }

        if let Some(existing) = self.records.get(&lsa.origin) {
            if !lsa.is_newer_than(existing.sequence_number) {
                let reason = if lsa.sequence_number == existing.sequence_number {
                    RejectReason::Duplicate
                } else {
                    RejectReason::Stale
                };
                debug!(
                    "Ignoring advertisement from {} (seq: {} vs {}): {}",
                    lsa.origin, lsa.sequence_number, existing.sequence_number, reason
                );
                return IngestOutcome::Rejected(reason);
            }
        }

        debug!(
            "Accepted advertisement from {} (seq: {}, {} links)",
            lsa.origin,
            lsa.sequence_number,
            lsa.links.len()
        );
        self.records.insert(lsa.origin.clone(), LinkStateRecord::from(lsa));

        IngestOutcome::Accepted
    }

    /// Get the record for one origin
    pub fn record(&self, origin: &Address) -> Option<&LinkStateRecord> {
        self.records.get(origin)
    }

    /// Iterate all records in origin order
    pub fn records(&self) -> impl Iterator<Item = &LinkStateRecord> {
        self.records.values()
    }

    /// Number of known origins
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no record is stored
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get database statistics
    pub fn stats(&self) -> LsdbStats {
        LsdbStats {
            total_origins: self.records.len(),
            total_links: self.records.values().map(|r| r.links.len()).sum(),
            local_sequence: self
                .records
                .get(&self.local_address)
                .map(|r| r.sequence_number)
                .unwrap_or(0),
        }
    }
}

/// Link-state database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsdbStats {
    /// Number of origins with a record
    pub total_origins: usize,
    /// Sum of advertised links over all records
    pub total_links: usize,
    /// Sequence number of the local record (0 before the first advertisement)
    pub local_sequence: SequenceNumber,
}
