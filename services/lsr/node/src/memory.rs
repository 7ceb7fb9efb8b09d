//! Deterministic in-memory network of link-state routers.
//!
//! Every packet a router sends is encoded to a frame, queued in FIFO order and
//! handed to the peer's [`LinkStateRouter::handle_frame`] on the next
//! [`MemoryNetwork::deliver_all`]. Time only moves through
//! [`MemoryNetwork::advance_to`].

use crate::config::{ConfigError, RouterConfig, DEFAULT_HEARTBEAT_INTERVAL_MS};
use crate::router::{Disposition, LinkStateRouter};
use bytes::Bytes;
use lsr_routing::RoutingDecision;
use lsr_wire::{Address, Cost, DataPacket, Packet, Port};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of frames one `deliver_all` call may hand out
pub const DEFAULT_DELIVERY_LIMIT: usize = 1_000_000;

/// In-memory network errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Node address not registered
    #[error("unknown node {0}")]
    UnknownNode(Address),

    /// Node address already registered
    #[error("node {0} already exists")]
    DuplicateNode(Address),

    /// Link endpoints already connected
    #[error("link {0} <-> {1} already exists")]
    DuplicateLink(Address, Address),

    /// No link between the endpoints
    #[error("no link between {0} and {1}")]
    MissingLink(Address, Address),

    /// Link from a node to itself
    #[error("cannot link {0} to itself")]
    SelfLink(Address),

    /// Flooding did not settle within the delivery limit
    #[error("delivery limit of {0} frames exceeded")]
    DeliveryLimit(usize),

    /// Router configuration rejected
    #[error("invalid router configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// In-memory network parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Heartbeat interval given to every router
    pub heartbeat_interval_ms: u64,
    /// Maximum frames handed out by one `deliver_all`
    pub delivery_limit: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            delivery_limit: DEFAULT_DELIVERY_LIMIT,
        }
    }
}

/// How a traceroute ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceOutcome {
    /// The destination was reached
    Reached,
    /// A node on the path had no route
    NoRoute,
    /// The path revisited a node
    Loop,
}

/// Hop-by-hop path followed by a data packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Nodes visited, starting with the source
    pub hops: Vec<Address>,
    /// How the walk ended
    pub outcome: TraceOutcome,
}

impl Trace {
    /// Check if the destination was reached
    pub fn reached(&self) -> bool {
        self.outcome == TraceOutcome::Reached
    }
}

#[derive(Debug, Clone)]
struct PeerPort {
    neighbor: Address,
    remote_port: Port,
}

#[derive(Debug)]
struct Node {
    router: LinkStateRouter,
    next_port: Port,
    ports: BTreeMap<Port, PeerPort>,
    delivered: Vec<DataPacket>,
}

#[derive(Debug, Clone)]
struct Link {
    ports: (Port, Port),
}

#[derive(Debug)]
struct InFlight {
    from: Address,
    to: Address,
    port: Port,
    frame: Bytes,
}

/// Simulated network of routers joined by point-to-point links
#[derive(Debug)]
pub struct MemoryNetwork {
    config: NetworkConfig,
    nodes: BTreeMap<Address, Node>,
    links: BTreeMap<(Address, Address), Link>,
    in_flight: VecDeque<InFlight>,
    transmissions: u64,
    now: u64,
}

fn link_key(a: &Address, b: &Address) -> (Address, Address) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

impl MemoryNetwork {
    /// Create an empty network
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            in_flight: VecDeque::new(),
            transmissions: 0,
            now: 0,
        }
    }

    /// Register a router
    pub fn add_node(&mut self, address: impl Into<Address>) -> Result<(), NetworkError> {
        let address = address.into();
        if self.nodes.contains_key(&address) {
            return Err(NetworkError::DuplicateNode(address));
        }

        let config = RouterConfig::new(address.clone())
            .with_heartbeat_interval_ms(self.config.heartbeat_interval_ms);
        let router = LinkStateRouter::new(config)?;

        self.nodes.insert(
            address,
            Node {
                router,
                next_port: 1,
                ports: BTreeMap::new(),
                delivered: Vec::new(),
            },
        );
        Ok(())
    }

    /// Connect two routers; both ends advertise the new link
    pub fn add_link(&mut self, a: &Address, b: &Address, cost: Cost) -> Result<(), NetworkError> {
        if a == b {
            return Err(NetworkError::SelfLink(a.clone()));
        }
        self.ensure_node(a)?;
        self.ensure_node(b)?;

        let key = link_key(a, b);
        if self.links.contains_key(&key) {
            return Err(NetworkError::DuplicateLink(key.0, key.1));
        }

        let port_a = self.allocate_port(a, b)?;
        let port_b = self.allocate_port(b, a)?;
        self.attach_peer(a, port_a, b, port_b)?;
        self.attach_peer(b, port_b, a, port_a)?;

        let ports = if &key.0 == a { (port_a, port_b) } else { (port_b, port_a) };
        self.links.insert(key, Link { ports });
        info!("Link {} (port {}) <-> {} (port {}) up, cost {}", a, port_a, b, port_b, cost);

        let mut outbox: Vec<(Port, Packet)> = Vec::new();
        self.node_mut(a)?
            .router
            .handle_new_link(port_a, b.clone(), cost, &mut outbox);
        self.enqueue(a, outbox);

        let mut outbox: Vec<(Port, Packet)> = Vec::new();
        self.node_mut(b)?
            .router
            .handle_new_link(port_b, a.clone(), cost, &mut outbox);
        self.enqueue(b, outbox);

        Ok(())
    }

    /// Disconnect two routers; frames still queued on the link are lost
    pub fn remove_link(&mut self, a: &Address, b: &Address) -> Result<(), NetworkError> {
        let key = link_key(a, b);
        let link = self
            .links
            .remove(&key)
            .ok_or_else(|| NetworkError::MissingLink(a.clone(), b.clone()))?;

        for (node, port) in [(&key.0, link.ports.0), (&key.1, link.ports.1)] {
            let mut outbox: Vec<(Port, Packet)> = Vec::new();
            let entry = self.node_mut(node)?;
            entry.ports.remove(&port);
            entry.router.handle_remove_link(port, &mut outbox);
            self.enqueue(node, outbox);
        }

        info!("Link {} <-> {} down", key.0, key.1);
        Ok(())
    }

    /// Deliver clock ticks up to `now` to every router, in address order.
    ///
    /// Returns how many routers sent a heartbeat.
    pub fn advance_to(&mut self, now: u64) -> usize {
        self.now = self.now.max(now);
        let addresses: Vec<Address> = self.nodes.keys().cloned().collect();

        let mut refreshed = 0;
        for address in &addresses {
            let mut outbox: Vec<(Port, Packet)> = Vec::new();
            if let Some(node) = self.nodes.get_mut(address) {
                if node.router.handle_time(self.now, &mut outbox) {
                    refreshed += 1;
                }
            }
            self.enqueue(address, outbox);
        }

        debug!("Advanced to {}: {} heartbeats", self.now, refreshed);
        refreshed
    }

    /// Deliver queued frames, including the ones they trigger, until the
    /// network is quiet.
    ///
    /// Returns the number of frames delivered.
    pub fn deliver_all(&mut self) -> Result<usize, NetworkError> {
        let mut delivered = 0;

        while let Some(frame) = self.in_flight.pop_front() {
            if delivered >= self.config.delivery_limit {
                self.in_flight.push_front(frame);
                return Err(NetworkError::DeliveryLimit(self.config.delivery_limit));
            }
            delivered += 1;

            let Some(node) = self.nodes.get_mut(&frame.to) else {
                continue;
            };
            let still_attached = node
                .ports
                .get(&frame.port)
                .is_some_and(|peer| peer.neighbor == frame.from);
            if !still_attached {
                debug!(
                    "Dropping frame from {} to {}: port {} no longer attached",
                    frame.from, frame.to, frame.port
                );
                continue;
            }

            let mut outbox: Vec<(Port, Packet)> = Vec::new();
            let disposition = node.router.handle_frame(frame.port, &frame.frame, &mut outbox);
            if let Disposition::Delivered(data) = disposition {
                node.delivered.push(data);
            }
            self.enqueue(&frame.to, outbox);
        }

        Ok(delivered)
    }

    /// Originate a data packet at `from` and queue whatever it sends
    pub fn send_data(
        &mut self,
        from: &Address,
        to: &Address,
        payload: Bytes,
    ) -> Result<Disposition, NetworkError> {
        self.ensure_node(to)?;
        let mut outbox: Vec<(Port, Packet)> = Vec::new();
        let node = self.node_mut(from)?;
        let disposition = node.router.send_data(to.clone(), payload, &mut outbox);
        if let Disposition::Delivered(data) = &disposition {
            node.delivered.push(data.clone());
        }
        self.enqueue(from, outbox);
        Ok(disposition)
    }

    /// Follow forwarding decisions from `from` towards `to` without sending
    /// anything
    pub fn traceroute(&self, from: &Address, to: &Address) -> Result<Trace, NetworkError> {
        self.ensure_node(to)?;

        let mut hops = vec![from.clone()];
        let mut current = self.node(from)?;

        loop {
            let next = match current.router.forwarding_table().decide(to) {
                RoutingDecision::Local => {
                    return Ok(Trace {
                        hops,
                        outcome: TraceOutcome::Reached,
                    })
                }
                RoutingDecision::Drop(_) => None,
                RoutingDecision::Forward(port) => current.ports.get(&port).map(|p| &p.neighbor),
            };

            let Some(next) = next else {
                return Ok(Trace {
                    hops,
                    outcome: TraceOutcome::NoRoute,
                });
            };

            if hops.contains(next) {
                hops.push(next.clone());
                return Ok(Trace {
                    hops,
                    outcome: TraceOutcome::Loop,
                });
            }

            hops.push(next.clone());
            current = self.node(next)?;
        }
    }

    /// Router registered under `address`
    pub fn router(&self, address: &Address) -> Option<&LinkStateRouter> {
        self.nodes.get(address).map(|node| &node.router)
    }

    /// All routers in address order
    pub fn routers(&self) -> impl Iterator<Item = &LinkStateRouter> {
        self.nodes.values().map(|node| &node.router)
    }

    /// Data packets delivered to `address`
    pub fn delivered(&self, address: &Address) -> &[DataPacket] {
        self.nodes
            .get(address)
            .map(|node| node.delivered.as_slice())
            .unwrap_or(&[])
    }

    /// Local port on `a` that leads to `b`
    pub fn port_between(&self, a: &Address, b: &Address) -> Option<Port> {
        let key = link_key(a, b);
        self.links
            .get(&key)
            .map(|link| if &key.0 == a { link.ports.0 } else { link.ports.1 })
    }

    /// Frames put on links since the network was created
    pub fn transmissions(&self) -> u64 {
        self.transmissions
    }

    /// Frames queued but not yet delivered
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    fn ensure_node(&self, address: &Address) -> Result<(), NetworkError> {
        self.node(address).map(|_| ())
    }

    fn node(&self, address: &Address) -> Result<&Node, NetworkError> {
        self.nodes
            .get(address)
            .ok_or_else(|| NetworkError::UnknownNode(address.clone()))
    }

    fn node_mut(&mut self, address: &Address) -> Result<&mut Node, NetworkError> {
        self.nodes
            .get_mut(address)
            .ok_or_else(|| NetworkError::UnknownNode(address.clone()))
    }

    fn allocate_port(&mut self, owner: &Address, peer: &Address) -> Result<Port, NetworkError> {
        let node = self.node_mut(owner)?;
        let port = node.next_port;
        node.next_port += 1;
        debug!("Allocated port {} on {} towards {}", port, owner, peer);
        Ok(port)
    }

    fn attach_peer(
        &mut self,
        owner: &Address,
        port: Port,
        neighbor: &Address,
        remote_port: Port,
    ) -> Result<(), NetworkError> {
        self.node_mut(owner)?.ports.insert(
            port,
            PeerPort {
                neighbor: neighbor.clone(),
                remote_port,
            },
        );
        Ok(())
    }

    fn enqueue(&mut self, from: &Address, outbox: Vec<(Port, Packet)>) {
        let Some(node) = self.nodes.get(from) else {
            return;
        };

        for (port, packet) in outbox {
            let Some(peer) = node.ports.get(&port) else {
                debug!("{} sent on unattached port {}, dropping", from, port);
                continue;
            };

            let frame = match lsr_wire::encode(&packet) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("{} produced an unencodable packet: {}", from, e);
                    continue;
                }
            };

            self.transmissions += 1;
            self.in_flight.push_back(InFlight {
                from: from.clone(),
                to: peer.neighbor.clone(),
                port: peer.remote_port,
                frame,
            });
        }
    }
}

impl Default for MemoryNetwork {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}
