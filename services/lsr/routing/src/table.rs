//! Forwarding table built from a shortest-path tree

use crate::links::LocalLinkTable;
use crate::router::{DropReason, RoutingDecision};
use lsr_topology::ShortestPathTree;
use lsr_wire::{Address, PathCost, Port};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Where to send packets for one destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingEntry {
    /// Destination node
    pub destination: Address,
    /// Local port leading to the first hop
    pub port: Port,
    /// Total path cost
    pub total_cost: PathCost,
}

/// Destination -> (port, cost) map for one node.
///
/// Holds only reachable destinations and never the local node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingTable {
    local_address: Address,
    entries: BTreeMap<Address, ForwardingEntry>,
}

impl ForwardingTable {
    /// Create an empty table for a node with no known routes
    pub fn empty(local_address: Address) -> Self {
        Self {
            local_address,
            entries: BTreeMap::new(),
        }
    }

    /// Build the table from a shortest-path tree rooted at the local node.
    ///
    /// Destinations whose first hop has no attached port are left out.
    pub fn build(tree: &ShortestPathTree, links: &LocalLinkTable) -> Self {
        let mut entries = BTreeMap::new();

        for (destination, total_cost) in tree.reachable() {
            let Some(first_hop) = tree.first_hop(destination) else {
                debug!("No traceable path to {}, skipping", destination);
                continue;
            };
            let Some(port) = links.port_to(first_hop) else {
                debug!(
                    "First hop {} towards {} is not attached, skipping",
                    first_hop, destination
                );
                continue;
            };

            entries.insert(
                destination.clone(),
                ForwardingEntry {
                    destination: destination.clone(),
                    port,
                    total_cost,
                },
            );
        }

        Self {
            local_address: tree.source().clone(),
            entries,
        }
    }

    /// Address of the node owning this table
    pub fn local_address(&self) -> &Address {
        &self.local_address
    }

    /// Entry for a destination
    pub fn get(&self, destination: &Address) -> Option<&ForwardingEntry> {
        self.entries.get(destination)
    }

    /// Decide what to do with a data packet for `destination`
    pub fn decide(&self, destination: &Address) -> RoutingDecision {
        if destination == &self.local_address {
            return RoutingDecision::Local;
        }

        match self.entries.get(destination) {
            Some(entry) => RoutingDecision::Forward(entry.port),
            None => RoutingDecision::Drop(DropReason::NoRoute),
        }
    }

    /// Entries in destination order
    pub fn iter(&self) -> impl Iterator<Item = &ForwardingEntry> {
        self.entries.values()
    }

    /// Number of destinations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no destinations
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ForwardingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<16} {:>6} {:>10}", "DESTINATION", "PORT", "COST")?;
        for entry in self.entries.values() {
            writeln!(
                f,
                "{:<16} {:>6} {:>10}",
                entry.destination.as_str(),
                entry.port,
                entry.total_cost
            )?;
        }
        Ok(())
    }
}
