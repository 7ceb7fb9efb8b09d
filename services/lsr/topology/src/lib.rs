//! Link-state database with freshness control and shortest-path trees for lsr.
//!
//! This crate holds the per-node view of the network graph: one
//! [`LinkStateRecord`] per known origin, replaced only by strictly fresher
//! advertisements, and a Dijkstra [`ShortestPathTree`] computed over it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod link_state;
pub mod spf;

pub use link_state::*;
pub use spf::ShortestPathTree;
