//! Addresses, link-state advertisements, packet types and frame codec for lsr.
//!
//! This crate defines everything that crosses the boundary between a routing
//! node and its transport: node addresses, the link-state advertisement (LSA)
//! payload, the tagged [`Packet`] enum, and the byte-level frame codec.
//!
//! ## Wire Format
//!
//! ```text
//! +----------------------+----------------------------+
//! | u32 body_len         | length of the CBOR body    |
//! +----------------------+----------------------------+
//! | u32 crc32            | checksum over the body     |
//! +----------------------+----------------------------+
//! | body                 | CBOR-encoded Packet        |
//! +----------------------+----------------------------+
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod codec;
pub mod error;
pub mod packet;

// Re-export main types
pub use address::{Address, Cost, LinkSet, PathCost, Port, SequenceNumber};
pub use codec::{decode, encode, FRAME_HEADER_SIZE, MAX_FRAME_SIZE};
pub use error::WireError;
pub use packet::{DataPacket, LinkStateAdvertisement, Packet, RoutingPacket};
