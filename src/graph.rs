use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::Direction;

/// Directed adjacency graph over integer-indexed items with the two named
/// relations "upstream" and "downstream".
///
/// Stored as two explicit relation maps from item index to set-of-indices.
/// `find(i, Upstream)` is the set of items that `i` is upstream of.
///
/// Invariants:
/// - every edge (a, rel, b) has its inverse (b, rel.opposite(), a);
///   `insert` maintains both, so no edge is ever unidirectional
/// - insertion is idempotent: duplicate input rows do not create duplicate
///   traversal results
///
/// Sets are `BTreeSet` so iteration order (and therefore anything derived
/// from it, including smallest-index tie-breaking) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    upstream: Vec<BTreeSet<usize>>,
    downstream: Vec<BTreeSet<usize>>,
}

impl AdjacencyGraph {
    pub fn with_items(n_items: usize) -> Self {
        Self {
            upstream: vec![BTreeSet::new(); n_items],
            downstream: vec![BTreeSet::new(); n_items],
        }
    }

    pub fn n_items(&self) -> usize {
        self.upstream.len()
    }

    fn relation(&self, direction: Direction) -> &Vec<BTreeSet<usize>> {
        match direction {
            Direction::Upstream => &self.upstream,
            Direction::Downstream => &self.downstream,
        }
    }

    fn relation_mut(&mut self, direction: Direction) -> &mut Vec<BTreeSet<usize>> {
        match direction {
            Direction::Upstream => &mut self.upstream,
            Direction::Downstream => &mut self.downstream,
        }
    }

    /// Insert the edge (item, direction, other) and its mandatory inverse
    /// (other, direction.opposite(), item).
    pub fn insert(&mut self, item: usize, direction: Direction, other: usize) {
        self.relation_mut(direction)[item].insert(other);
        self.relation_mut(direction.opposite())[other].insert(item);
    }

    /// Items reachable from `item` via exactly one edge of `direction`.
    pub fn find(&self, item: usize, direction: Direction) -> &BTreeSet<usize> {
        &self.relation(direction)[item]
    }

    /// One more `direction` hop from every member of `set`, unioned.
    pub fn traverse(&self, set: &BTreeSet<usize>, direction: Direction) -> BTreeSet<usize> {
        let relation = self.relation(direction);
        let mut out = BTreeSet::new();
        for &item in set {
            out.extend(relation[item].iter().copied());
        }
        out
    }

    /// Items present in both sets.
    pub fn intersect(a: &BTreeSet<usize>, b: &BTreeSet<usize>) -> BTreeSet<usize> {
        a.intersection(b).copied().collect()
    }

    pub fn contains_edge(&self, item: usize, direction: Direction, other: usize) -> bool {
        self.relation(direction)[item].contains(&other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn every_edge_has_its_inverse() {
        let mut g = AdjacencyGraph::with_items(4);
        g.insert(0, Direction::Upstream, 2);
        g.insert(1, Direction::Downstream, 3);

        assert!(g.contains_edge(0, Direction::Upstream, 2));
        assert!(g.contains_edge(2, Direction::Downstream, 0));
        assert!(g.contains_edge(1, Direction::Downstream, 3));
        assert!(g.contains_edge(3, Direction::Upstream, 1));
    }

    #[test]
    fn insertion_is_idempotent() {
        let mut g = AdjacencyGraph::with_items(2);
        g.insert(0, Direction::Upstream, 1);
        g.insert(0, Direction::Upstream, 1);
        g.insert(0, Direction::Upstream, 1);

        assert_eq!(g.find(0, Direction::Upstream).len(), 1);
        assert_eq!(g.find(1, Direction::Downstream).len(), 1);
    }

    #[test]
    fn find_traverse_intersect() {
        // 0 and 1 both upstream of 2; 2 upstream of 3 and 4.
        let mut g = AdjacencyGraph::with_items(5);
        g.insert(0, Direction::Upstream, 2);
        g.insert(1, Direction::Upstream, 2);
        g.insert(2, Direction::Upstream, 3);
        g.insert(2, Direction::Upstream, 4);

        assert_eq!(g.find(0, Direction::Upstream), &set(&[2]));
        assert_eq!(g.find(2, Direction::Downstream), &set(&[0, 1]));

        let one_hop = g.traverse(&set(&[0, 1]), Direction::Upstream);
        assert_eq!(one_hop, set(&[2]));
        let two_hops = g.traverse(&one_hop, Direction::Upstream);
        assert_eq!(two_hops, set(&[3, 4]));

        assert_eq!(
            AdjacencyGraph::intersect(&set(&[2, 3, 4]), &set(&[3, 5])),
            set(&[3])
        );
    }
}
