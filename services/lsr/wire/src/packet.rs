//! Packet and link-state advertisement structures.

use crate::address::{Address, LinkSet, SequenceNumber};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Link-state advertisement: the links one origin had at a given sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStateAdvertisement {
    /// Node that originated this advertisement
    pub origin: Address,
    /// Sequence number for freshness and loop prevention
    pub sequence_number: SequenceNumber,
    /// Neighbors of the origin and the cost to reach each
    pub links: LinkSet,
}

impl LinkStateAdvertisement {
    /// Create a new advertisement
    pub fn new(origin: Address, sequence_number: SequenceNumber, links: LinkSet) -> Self {
        Self {
            origin,
            sequence_number,
            links,
        }
    }

    /// Check if this advertisement is strictly newer than a stored sequence
    pub fn is_newer_than(&self, stored: SequenceNumber) -> bool {
        self.sequence_number > stored
    }
}

/// User data routed hop by hop through forwarding tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacket {
    /// Node that created the packet
    pub src: Address,
    /// Final destination
    pub dst: Address,
    /// Opaque payload, never inspected by routers
    pub payload: Bytes,
}

/// Routing packet carrying one advertisement across one link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPacket {
    /// Node that put this packet on the link
    pub src: Address,
    /// Immediate neighbor the packet is sent to
    pub dst: Address,
    /// Advertisement being flooded
    pub advertisement: LinkStateAdvertisement,
}

/// Message exchanged between nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Packet {
    /// Data to forward towards `dst`
    Data(DataPacket),
    /// Link-state advertisement for the neighbor `dst`
    Routing(RoutingPacket),
}

impl Packet {
    /// Build a data packet
    pub fn data(src: Address, dst: Address, payload: Bytes) -> Self {
        Packet::Data(DataPacket { src, dst, payload })
    }

    /// Build a routing packet
    pub fn routing(src: Address, dst: Address, advertisement: LinkStateAdvertisement) -> Self {
        Packet::Routing(RoutingPacket {
            src,
            dst,
            advertisement,
        })
    }

    /// Source address of this packet
    pub fn src(&self) -> &Address {
        match self {
            Packet::Data(data) => &data.src,
            Packet::Routing(routing) => &routing.src,
        }
    }

    /// Destination address of this packet
    pub fn dst(&self) -> &Address {
        match self {
            Packet::Data(data) => &data.dst,
            Packet::Routing(routing) => &routing.dst,
        }
    }
}
