//! Shortest-path tree over the link-state database.

use crate::link_state::LinkStateDatabase;
use lsr_wire::{Address, PathCost};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use tracing::debug;

/// Result of one Dijkstra run from a source node.
///
/// Edges are the links each origin advertises, so asymmetric costs and
/// one-way adjacencies are honored as advertised.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: Address,
    distances: BTreeMap<Address, PathCost>,
    predecessors: BTreeMap<Address, Address>,
}

impl ShortestPathTree {
    /// Compute shortest paths from `source` using Dijkstra's algorithm.
    ///
    /// Ties on distance are broken by expanding the smaller address first and
    /// a predecessor is only replaced by a strictly shorter path, so the same
    /// database always yields the same tree.
    pub fn compute(lsdb: &LinkStateDatabase, source: &Address) -> Self {
        let mut distances: BTreeMap<Address, PathCost> = BTreeMap::new();
        let mut predecessors: BTreeMap<Address, Address> = BTreeMap::new();
        let mut visited: BTreeSet<Address> = BTreeSet::new();
        let mut heap = BinaryHeap::new();

        distances.insert(source.clone(), 0);
        heap.push(Reverse((0 as PathCost, source.clone())));

        while let Some(Reverse((dist, node))) = heap.pop() {
            if !visited.insert(node.clone()) {
                continue;
            }

            // Nodes that never advertised are leaves
            let Some(record) = lsdb.record(&node) else {
                continue;
            };

            for (neighbor, &cost) in &record.links {
                if visited.contains(neighbor) {
                    continue;
                }

                let candidate = dist.saturating_add(PathCost::from(cost));
                let improved = distances
                    .get(neighbor)
                    .map_or(true, |&known| candidate < known);

                if improved {
                    distances.insert(neighbor.clone(), candidate);
                    predecessors.insert(neighbor.clone(), node.clone());
                    heap.push(Reverse((candidate, neighbor.clone())));
                }
            }
        }

        debug!(
            "Computed shortest paths from {}: {} reachable nodes",
            source,
            distances.len().saturating_sub(1)
        );

        Self {
            source: source.clone(),
            distances,
            predecessors,
        }
    }

    /// Node the tree is rooted at
    pub fn source(&self) -> &Address {
        &self.source
    }

    /// Total cost from the source, if reachable
    pub fn distance(&self, dst: &Address) -> Option<PathCost> {
        self.distances.get(dst).copied()
    }

    /// Neighbor of the source that starts the shortest path to `dst`.
    ///
    /// Returns `None` for the source itself, for unreachable nodes, and for
    /// chains that do not lead back to the source.
    pub fn first_hop(&self, dst: &Address) -> Option<&Address> {
        let (mut current, _) = self.predecessors.get_key_value(dst)?;
        for _ in 0..=self.predecessors.len() {
            let prev = self.predecessors.get(current)?;
            if prev == &self.source {
                return Some(current);
            }
            current = prev;
        }
        None
    }

    /// Full path from the source to `dst`, both ends included
    pub fn path(&self, dst: &Address) -> Option<Vec<Address>> {
        if !self.distances.contains_key(dst) {
            return None;
        }

        let mut path = vec![dst.clone()];
        let mut current = dst;
        while current != &self.source {
            current = self.predecessors.get(current)?;
            if path.len() > self.predecessors.len() {
                return None;
            }
            path.push(current.clone());
        }
        path.reverse();
        Some(path)
    }

    /// Reachable destinations other than the source, in address order
    pub fn reachable(&self) -> impl Iterator<Item = (&Address, PathCost)> {
        self.distances
            .iter()
            .filter(move |(addr, _)| *addr != &self.source)
            .map(|(addr, &cost)| (addr, cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsr_wire::{Cost, LinkStateAdvertisement, SequenceNumber};

    fn addr(id: &str) -> Address {
        Address::from(id)
    }

    fn advertise(
        db: &mut LinkStateDatabase,
        origin: &str,
        seq: SequenceNumber,
        links: &[(&str, Cost)],
    ) {
        let links = links.iter().map(|(a, c)| (addr(a), *c)).collect();
        if addr(origin) == *db.local_address() {
            db.install_local(seq, links);
        } else {
            db.ingest(&LinkStateAdvertisement::new(addr(origin), seq, links));
        }
    }

    fn line_db(local: &str) -> LinkStateDatabase {
        let mut db = LinkStateDatabase::new(addr(local));
        advertise(&mut db, "A", 1, &[("B", 1)]);
        advertise(&mut db, "B", 1, &[("A", 1), ("C", 1)]);
        advertise(&mut db, "C", 1, &[("B", 1)]);
        db
    }

    #[test]
    fn test_line_topology() {
        let db = line_db("A");
        let tree = ShortestPathTree::compute(&db, &addr("A"));

        assert_eq!(tree.distance(&addr("A")), Some(0));
        assert_eq!(tree.distance(&addr("B")), Some(1));
        assert_eq!(tree.distance(&addr("C")), Some(2));
        assert_eq!(tree.first_hop(&addr("C")), Some(&addr("B")));
        assert_eq!(tree.first_hop(&addr("B")), Some(&addr("B")));
        assert_eq!(tree.first_hop(&addr("A")), None);
        assert_eq!(
            tree.path(&addr("C")),
            Some(vec![addr("A"), addr("B"), addr("C")])
        );
    }

    #[test]
    fn test_prefers_cheaper_longer_path() {
        let mut db = LinkStateDatabase::new(addr("A"));
        advertise(&mut db, "A", 1, &[("B", 10), ("C", 1)]);
        advertise(&mut db, "C", 1, &[("A", 1), ("D", 1)]);
        advertise(&mut db, "D", 1, &[("C", 1), ("B", 1)]);
        advertise(&mut db, "B", 1, &[("A", 10), ("D", 1)]);

        let tree = ShortestPathTree::compute(&db, &addr("A"));
        assert_eq!(tree.distance(&addr("B")), Some(3));
        assert_eq!(tree.first_hop(&addr("B")), Some(&addr("C")));
    }

    #[test]
    fn test_equal_cost_tie_break_is_deterministic() {
        let mut db = LinkStateDatabase::new(addr("A"));
        advertise(&mut db, "A", 1, &[("C", 1), ("B", 1)]);
        advertise(&mut db, "B", 1, &[("A", 1), ("D", 1)]);
        advertise(&mut db, "C", 1, &[("A", 1), ("D", 1)]);
        advertise(&mut db, "D", 1, &[("B", 1), ("C", 1)]);

        for _ in 0..3 {
            let tree = ShortestPathTree::compute(&db, &addr("A"));
            assert_eq!(tree.distance(&addr("D")), Some(2));
            assert_eq!(tree.first_hop(&addr("D")), Some(&addr("B")));
        }
    }

    #[test]
    fn test_asymmetric_links() {
        let mut db = LinkStateDatabase::new(addr("B"));
        advertise(&mut db, "A", 1, &[("B", 1)]);
        advertise(&mut db, "B", 1, &[("C", 1)]);
        advertise(&mut db, "C", 1, &[("B", 1)]);

        let from_b = ShortestPathTree::compute(&db, &addr("B"));
        assert_eq!(from_b.distance(&addr("C")), Some(1));
        assert_eq!(from_b.distance(&addr("A")), None);
        assert_eq!(from_b.first_hop(&addr("A")), None);

        let from_a = ShortestPathTree::compute(&db, &addr("A"));
        assert_eq!(from_a.distance(&addr("C")), Some(2));
    }

    #[test]
    fn test_unreachable_and_leaf_nodes() {
        let mut db = LinkStateDatabase::new(addr("A"));
        advertise(&mut db, "A", 1, &[("B", 2)]);
        advertise(&mut db, "B", 1, &[("A", 2), ("h1", 1)]);
        advertise(&mut db, "X", 1, &[("Y", 1)]);

        let tree = ShortestPathTree::compute(&db, &addr("A"));
        assert_eq!(tree.distance(&addr("h1")), Some(3));
        assert_eq!(tree.first_hop(&addr("h1")), Some(&addr("B")));
        assert_eq!(tree.distance(&addr("X")), None);
        assert_eq!(tree.distance(&addr("Y")), None);

        let reachable: Vec<_> = tree.reachable().map(|(a, c)| (a.as_str(), c)).collect();
        assert_eq!(reachable, vec![("B", 2), ("h1", 3)]);
    }

    #[test]
    fn test_source_without_record() {
        let db = LinkStateDatabase::new(addr("A"));
        let tree = ShortestPathTree::compute(&db, &addr("A"));

        assert_eq!(tree.distance(&addr("A")), Some(0));
        assert_eq!(tree.reachable().count(), 0);
    }

    #[test]
    fn test_zero_cost_and_maximum_cost_links() {
        let mut db = LinkStateDatabase::new(addr("A"));
        advertise(&mut db, "A", 1, &[("B", 0)]);
        advertise(&mut db, "B", 1, &[("C", Cost::MAX)]);
        advertise(&mut db, "C", 1, &[("D", 5)]);

        let tree = ShortestPathTree::compute(&db, &addr("A"));
        let max = PathCost::from(Cost::MAX);
        assert_eq!(tree.distance(&addr("B")), Some(0));
        assert_eq!(tree.distance(&addr("C")), Some(max));
        assert_eq!(tree.distance(&addr("D")), Some(max + 5));
        assert_eq!(tree.first_hop(&addr("D")), Some(&addr("B")));
    }

    #[test]
    fn test_totals_beyond_link_cost_range_stay_exact() {
        let mut db = LinkStateDatabase::new(addr("A"));
        advertise(&mut db, "A", 1, &[("B", Cost::MAX - 1), ("C", Cost::MAX)]);
        advertise(&mut db, "B", 1, &[("D", 10)]);
        advertise(&mut db, "C", 1, &[("D", 1)]);

        let tree = ShortestPathTree::compute(&db, &addr("A"));
        assert_eq!(tree.distance(&addr("D")), Some(PathCost::from(Cost::MAX) + 1));
        assert_eq!(tree.first_hop(&addr("D")), Some(&addr("C")));
        assert_eq!(
            tree.path(&addr("D")),
            Some(vec![addr("A"), addr("C"), addr("D")])
        );
    }

    #[test]
    fn test_first_hop_borrows_from_tree() {
        let tree = ShortestPathTree::compute(&line_db("A"), &addr("A"));
        let hop = {
            let dst = addr("B");
            tree.first_hop(&dst).cloned()
        };
        assert_eq!(hop, Some(addr("B")));

        let first_hops: Vec<&Address> = ["B", "C"]
            .iter()
            .filter_map(|id| tree.first_hop(&addr(id)))
            .collect();
        assert_eq!(first_hops, vec![&addr("B"), &addr("B")]);
    }
}
