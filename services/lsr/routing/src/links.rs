//! Links attached to the local node

use lsr_wire::{Address, Cost, LinkSet, Port};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One attached link as seen from the local node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalLink {
    /// Local port the link is attached to
    pub port: Port,
    /// Node at the far end
    pub neighbor: Address,
    /// Cost of sending over this link
    pub cost: Cost,
}

/// Port-indexed table of attached links
#[derive(Debug, Clone, Default)]
pub struct LocalLinkTable {
    links: BTreeMap<Port, LocalLink>,
}

impl LocalLinkTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or overwrite the link on `port`.
    ///
    /// Returns the link previously attached to that port, if any.
    pub fn add_link(&mut self, port: Port, neighbor: Address, cost: Cost) -> Option<LocalLink> {
        self.links.insert(
            port,
            LocalLink {
                port,
                neighbor,
                cost,
            },
        )
    }

    /// Detach the link on `port`, returning whether one was present
    pub fn remove_link(&mut self, port: Port) -> bool {
        self.links.remove(&port).is_some()
    }

    /// Link attached to `port`
    pub fn get(&self, port: Port) -> Option<&LocalLink> {
        self.links.get(&port)
    }

    /// Attached links in ascending port order
    pub fn iter(&self) -> impl Iterator<Item = &LocalLink> {
        self.links.values()
    }

    /// Attached ports in ascending order
    pub fn ports(&self) -> impl Iterator<Item = Port> + '_ {
        self.links.keys().copied()
    }

    /// Number of attached links
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Check if no link is attached
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Neighbors and costs to advertise.
    ///
    /// Parallel links to the same neighbor collapse to the cheapest one.
    pub fn link_set(&self) -> LinkSet {
        let mut set = LinkSet::new();
        for link in self.links.values() {
            set.entry(link.neighbor.clone())
                .and_modify(|cost| *cost = (*cost).min(link.cost))
                .or_insert(link.cost);
        }
        set
    }

    /// Port used to reach a directly attached neighbor.
    ///
    /// Picks the cheapest link, then the lowest port.
    pub fn port_to(&self, neighbor: &Address) -> Option<Port> {
        self.links
            .values()
            .filter(|link| &link.neighbor == neighbor)
            .min_by_key(|link| (link.cost, link.port))
            .map(|link| link.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut links = LocalLinkTable::new();
        assert!(links.add_link(2, Address::from("B"), 1).is_none());
        assert!(links.add_link(1, Address::from("C"), 3).is_none());

        let ports: Vec<Port> = links.ports().collect();
        assert_eq!(ports, vec![1, 2]);
        assert_eq!(links.get(2).unwrap().neighbor.as_str(), "B");

        let replaced = links.add_link(2, Address::from("D"), 5).unwrap();
        assert_eq!(replaced.neighbor.as_str(), "B");
        assert_eq!(links.len(), 2);

        assert!(links.remove_link(2));
        assert!(!links.remove_link(2));
        assert!(!links.remove_link(99));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_link_set_uses_cheapest_parallel_link() {
        let mut links = LocalLinkTable::new();
        links.add_link(1, Address::from("B"), 4);
        links.add_link(2, Address::from("B"), 2);
        links.add_link(3, Address::from("C"), 7);

        let set = links.link_set();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&Address::from("B")), Some(&2));
        assert_eq!(set.get(&Address::from("C")), Some(&7));
    }

    #[test]
    fn test_port_to_neighbor() {
        let mut links = LocalLinkTable::new();
        links.add_link(5, Address::from("B"), 2);
        links.add_link(3, Address::from("B"), 2);
        links.add_link(1, Address::from("B"), 9);
        links.add_link(4, Address::from("C"), 1);

        assert_eq!(links.port_to(&Address::from("B")), Some(3));
        assert_eq!(links.port_to(&Address::from("C")), Some(4));
        assert_eq!(links.port_to(&Address::from("Z")), None);
    }
}
