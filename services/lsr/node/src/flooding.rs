//! Origination and relay of link-state advertisements.
//!
//! Flooding terminates because [`FloodingEngine::relay`] is only called for
//! advertisements the database accepted as strictly fresher, so one record
//! crosses each directed link at most once.

use crate::transport::Transport;
use lsr_routing::LocalLinkTable;
use lsr_topology::LinkStateDatabase;
use lsr_wire::{Address, LinkStateAdvertisement, Packet, Port, SequenceNumber};
use tracing::debug;

/// Owner of the local sequence number
#[derive(Debug, Clone, Default)]
pub struct FloodingEngine {
    sequence_number: SequenceNumber,
}

impl FloodingEngine {
    /// Create an engine that has not advertised yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number of the last local advertisement (0 before the first)
    pub fn sequence_number(&self) -> SequenceNumber {
        self.sequence_number
    }

    /// Advertise the current local links to every neighbor.
    ///
    /// Advances the sequence number, rewrites the local LSDB record and
    /// returns the advertisement along with the number of packets sent.
    pub fn advertise_local_state(
        &mut self,
        local: &Address,
        links: &LocalLinkTable,
        lsdb: &mut LinkStateDatabase,
        transport: &mut dyn Transport,
    ) -> (LinkStateAdvertisement, usize) {
        self.sequence_number = self.sequence_number.saturating_add(1);

        let lsa =
            LinkStateAdvertisement::new(local.clone(), self.sequence_number, links.link_set());
        lsdb.install_local(lsa.sequence_number, lsa.links.clone());

        let sent = send_except(local, links, None, &lsa, transport);
        debug!(
            "Advertised {} links (seq: {}) on {} ports",
            lsa.links.len(),
            lsa.sequence_number,
            sent
        );

        (lsa, sent)
    }

    /// Pass an accepted advertisement on to every neighbor except the one it
    /// came from
    pub fn relay(
        &self,
        local: &Address,
        links: &LocalLinkTable,
        arrival_port: Port,
        lsa: &LinkStateAdvertisement,
        transport: &mut dyn Transport,
    ) -> usize {
        let sent = send_except(local, links, Some(arrival_port), lsa, transport);
        debug!(
            "Relayed advertisement from {} (seq: {}) on {} ports",
            lsa.origin, lsa.sequence_number, sent
        );
        sent
    }
}

fn send_except(
    local: &Address,
    links: &LocalLinkTable,
    skip: Option<Port>,
    lsa: &LinkStateAdvertisement,
    transport: &mut dyn Transport,
) -> usize {
    let mut sent = 0;
    for link in links.iter().filter(|link| Some(link.port) != skip) {
        transport.send(
            link.port,
            Packet::routing(local.clone(), link.neighbor.clone(), lsa.clone()),
        );
        sent += 1;
    }
    sent
}
