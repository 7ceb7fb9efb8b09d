//! Node addresses and the scalar types attached to links.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Local identifier of one attached link on a node
pub type Port = u32;

/// Non-negative cost of a single link
pub type Cost = u32;

/// Sum of link costs along a path, wider than [`Cost`] so totals do not clamp
pub type PathCost = u64;

/// Per-origin advertisement counter
pub type SequenceNumber = u64;

/// Neighbor address -> link cost, as advertised by one origin
pub type LinkSet = BTreeMap<Address, Cost>;

/// Opaque identifier of a node in the network.
///
/// Addresses are totally ordered so that maps keyed by them iterate
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create a new address
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the address is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Address {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_ordering_and_display() {
        let a = Address::from("A");
        let b = Address::new(String::from("B"));

        assert!(a < b);
        assert_eq!(a.to_string(), "A");
        assert_eq!(b.as_str(), "B");
        assert!(!a.is_empty());
        assert!(Address::from("").is_empty());
    }

    #[test]
    fn test_address_serializes_as_plain_string() {
        let mut links = LinkSet::new();
        links.insert(Address::from("B"), 3);

        let json = serde_json::to_string(&links).unwrap();
        assert_eq!(json, r#"{"B":3}"#);

        let back: LinkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, links);
    }
}
