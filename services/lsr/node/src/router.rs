//! Link-state router: the single entry point for all node events.
//!
//! Every handler runs to completion on `&mut self`. Handlers never fail:
//! anything the router cannot use is dropped, logged and counted in
//! [`NodeStats`].

use crate::config::{ConfigError, RouterConfig};
use crate::flooding::FloodingEngine;
use crate::stats::NodeStats;
use crate::transport::Transport;
use bytes::Bytes;
use lsr_routing::{DropReason, ForwardingTable, LocalLinkTable, RoutingDecision};
use lsr_topology::{IngestOutcome, LinkStateDatabase, RejectReason, ShortestPathTree};
use lsr_wire::{Address, Cost, DataPacket, Packet, Port, RoutingPacket, SequenceNumber};
use std::fmt;
use tracing::{debug, info, warn};

/// What the router did with one packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Data packet addressed to this node
    Delivered(DataPacket),
    /// Data packet sent out of this port
    Forwarded(Port),
    /// Packet discarded
    Dropped(DropReason),
    /// Advertisement stored and relayed to this many neighbors
    Accepted {
        /// Number of routing packets sent
        relayed: usize,
    },
    /// Advertisement ignored
    Rejected(RejectReason),
}

/// Link-state routing node
#[derive(Debug)]
pub struct LinkStateRouter {
    config: RouterConfig,
    links: LocalLinkTable,
    lsdb: LinkStateDatabase,
    flooding: FloodingEngine,
    forwarding: ForwardingTable,
    last_refresh: u64,
    stats: NodeStats,
}

impl LinkStateRouter {
    /// Create a router with no links
    pub fn new(config: RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let address = config.address.clone();
        info!(
            "Creating link-state router {} (heartbeat: {}ms)",
            address, config.heartbeat_interval_ms
        );

        Ok(Self {
            lsdb: LinkStateDatabase::new(address.clone()),
            forwarding: ForwardingTable::empty(address),
            links: LocalLinkTable::new(),
            flooding: FloodingEngine::new(),
            last_refresh: 0,
            stats: NodeStats::new(),
            config,
        })
    }

    /// Address of this node
    pub fn address(&self) -> &Address {
        &self.config.address
    }

    /// Handle a packet that arrived on `port`
    pub fn handle_packet(
        &mut self,
        port: Port,
        packet: Packet,
        transport: &mut dyn Transport,
    ) -> Disposition {
        match packet {
            Packet::Data(data) => self.route_data(data, transport),
            Packet::Routing(routing) => self.handle_routing(port, routing, transport),
        }
    }

    /// Decode a raw frame that arrived on `port` and handle it
    pub fn handle_frame(
        &mut self,
        port: Port,
        frame: &[u8],
        transport: &mut dyn Transport,
    ) -> Disposition {
        match lsr_wire::decode(frame) {
            Ok(packet) => self.handle_packet(port, packet, transport),
            Err(e) => {
                warn!(
                    "{}: discarding malformed frame on port {} ({} bytes): {}",
                    self.config.address,
                    port,
                    frame.len(),
                    e
                );
                self.stats.malformed_frames += 1;
                Disposition::Dropped(DropReason::Malformed)
            }
        }
    }

    /// Originate a data packet from this node
    pub fn send_data(
        &mut self,
        dst: Address,
        payload: Bytes,
        transport: &mut dyn Transport,
    ) -> Disposition {
        let data = DataPacket {
            src: self.config.address.clone(),
            dst,
            payload,
        };
        self.route_data(data, transport)
    }

    /// A link came up on `port`
    pub fn handle_new_link(
        &mut self,
        port: Port,
        neighbor: Address,
        cost: Cost,
        transport: &mut dyn Transport,
    ) {
        info!(
            "{}: link up on port {} to {} (cost: {})",
            self.config.address, port, neighbor, cost
        );
        if let Some(previous) = self.links.add_link(port, neighbor, cost) {
            debug!(
                "{}: port {} previously attached to {}",
                self.config.address, port, previous.neighbor
            );
        }
        self.refresh(transport);
    }

    /// The link on `port` went down.
    ///
    /// Returns `false` without side effects when nothing was attached there.
    pub fn handle_remove_link(&mut self, port: Port, transport: &mut dyn Transport) -> bool {
        if !self.links.remove_link(port) {
            debug!("{}: no link on port {} to remove", self.config.address, port);
            return false;
        }

        info!("{}: link down on port {}", self.config.address, port);
        self.refresh(transport);
        true
    }

    /// Clock tick. Re-advertises when a heartbeat interval has elapsed.
    ///
    /// Returns whether a heartbeat was sent.
    pub fn handle_time(&mut self, now: u64, transport: &mut dyn Transport) -> bool {
        if now.saturating_sub(self.last_refresh) < self.config.heartbeat_interval_ms {
            return false;
        }

        self.last_refresh = now;
        debug!("{}: heartbeat at {}", self.config.address, now);
        self.refresh(transport);
        true
    }

    /// Current forwarding table
    pub fn forwarding_table(&self) -> &ForwardingTable {
        &self.forwarding
    }

    /// Link-state database
    pub fn lsdb(&self) -> &LinkStateDatabase {
        &self.lsdb
    }

    /// Attached links
    pub fn links(&self) -> &LocalLinkTable {
        &self.links
    }

    /// Router statistics
    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Sequence number of the last local advertisement
    pub fn sequence_number(&self) -> SequenceNumber {
        self.flooding.sequence_number()
    }

    /// Time of the last heartbeat
    pub fn last_refresh(&self) -> u64 {
        self.last_refresh
    }

    fn route_data(&mut self, data: DataPacket, transport: &mut dyn Transport) -> Disposition {
        match self.forwarding.decide(&data.dst) {
            RoutingDecision::Local => {
                debug!(
                    "{}: delivered data from {} ({} bytes)",
                    self.config.address,
                    data.src,
                    data.payload.len()
                );
                self.stats.data_delivered += 1;
                Disposition::Delivered(data)
            }
            RoutingDecision::Forward(port) => {
                debug!(
                    "{}: forwarding data for {} on port {}",
                    self.config.address, data.dst, port
                );
                transport.send(port, Packet::Data(data));
                self.stats.data_forwarded += 1;
                Disposition::Forwarded(port)
            }
            RoutingDecision::Drop(reason) => {
                debug!(
                    "{}: dropping data for {}: {}",
                    self.config.address, data.dst, reason
                );
                self.stats.data_dropped += 1;
                Disposition::Dropped(reason)
            }
        }
    }

    fn handle_routing(
        &mut self,
        port: Port,
        routing: RoutingPacket,
        transport: &mut dyn Transport,
    ) -> Disposition {
        match self.lsdb.ingest(&routing.advertisement) {
            IngestOutcome::Accepted => {
                self.stats.lsa_accepted += 1;
                self.recompute();
                let relayed = self.flooding.relay(
                    &self.config.address,
                    &self.links,
                    port,
                    &routing.advertisement,
                    transport,
                );
                self.stats.lsa_sent += relayed as u64;
                Disposition::Accepted { relayed }
            }
            IngestOutcome::Rejected(reason) => {
                self.stats.lsa_rejected += 1;
                Disposition::Rejected(reason)
            }
        }
    }

    /// Advance the sequence, advertise and recompute
    fn refresh(&mut self, transport: &mut dyn Transport) {
        let (_, sent) = self.flooding.advertise_local_state(
            &self.config.address,
            &self.links,
            &mut self.lsdb,
            transport,
        );
        self.stats.lsa_originated += 1;
        self.stats.lsa_sent += sent as u64;
        self.recompute();
    }

    /// Rebuild the forwarding table from the LSDB and the attached links
    pub fn recompute(&mut self) -> &ForwardingTable {
        let tree = ShortestPathTree::compute(&self.lsdb, &self.config.address);
        self.forwarding = ForwardingTable::build(&tree, &self.links);
        self.stats.spf_runs += 1;
        debug!(
            "{}: forwarding table rebuilt with {} destinations",
            self.config.address,
            self.forwarding.len()
        );
        &self.forwarding
    }
}

impl fmt::Display for LinkStateRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "LinkStateRouter({}, seq: {}, links: {}, known origins: {})",
            self.config.address,
            self.flooding.sequence_number(),
            self.links.len(),
            self.lsdb.len()
        )?;
        write!(f, "{}", self.forwarding)
    }
}
