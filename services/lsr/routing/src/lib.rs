//! Local link table, forwarding table and routing decisions for lsr.
//!
//! The forwarding table is a pure function of the link-state database and the
//! node's attached links: it is rebuilt wholesale from a
//! [`lsr_topology::ShortestPathTree`] whenever either changes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod links;
pub mod router;
pub mod table;

pub use links::*;
pub use router::*;
pub use table::*;
