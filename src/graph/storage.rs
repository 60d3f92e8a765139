//! storage.rs
//! Dense arena of edge records over a fixed node set.

use super::edge::EdgeMarks;
use super::pair::PairKey;
use crate::store::NodeId;
use std::collections::BTreeSet;

/// Edge records live in an upper-triangular slot array indexed by `PairKey::slot`,
/// so every pair has exactly one record. Neighbour sets are ordered, which makes
/// every enumeration over adjacencies deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeArena {
    node_count: usize,
    slots: Vec<Option<EdgeMarks>>,
    adjacency: Vec<BTreeSet<NodeId>>,
}

impl EdgeArena {
    pub fn empty(node_count: usize) -> Self {
        Self {
            node_count,
            slots: vec![None; PairKey::slot_count(node_count)],
            adjacency: vec![BTreeSet::new(); node_count],
        }
    }

    pub fn complete(node_count: usize) -> Self {
        let mut arena = Self::empty(node_count);
        for i in 0..node_count {
            for j in (i + 1)..node_count {
                if let Some(key) = PairKey::new(NodeId::new(i), NodeId::new(j)) {
                    arena.insert(key, EdgeMarks::default());
                }
            }
        }
        arena
    }

    pub fn node_count(&self) -> usize { self.node_count }

    #[inline(always)]
    pub fn get(&self, key: PairKey) -> Option<&EdgeMarks> {
        self.slots[key.slot(self.node_count)].as_ref()
    }

    #[inline(always)]
    pub fn get_mut(&mut self, key: PairKey) -> Option<&mut EdgeMarks> {
        let slot = key.slot(self.node_count);
        self.slots[slot].as_mut()
    }

    pub fn insert(&mut self, key: PairKey, marks: EdgeMarks) {
        let slot = key.slot(self.node_count);
        self.slots[slot] = Some(marks);
        self.adjacency[key.lo().index()].insert(key.hi());
        self.adjacency[key.hi().index()].insert(key.lo());
    }

    pub fn remove(&mut self, key: PairKey) -> Option<EdgeMarks> {
        let slot = key.slot(self.node_count);
        let removed = self.slots[slot].take();
        if removed.is_some() {
            self.adjacency[key.lo().index()].remove(&key.hi());
            self.adjacency[key.hi().index()].remove(&key.lo());
        }
        removed
    }

    #[inline(always)]
    pub fn neighbours(&self, n: NodeId) -> &BTreeSet<NodeId> {
        &self.adjacency[n.index()]
    }

    /// Present edges in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (PairKey, &EdgeMarks)> + '_ {
        let n = self.node_count;
        (0..n).flat_map(move |i| {
            let lo = NodeId::new(i);
            self.adjacency[i]
                .range(NodeId::new(i + 1)..)
                .filter_map(move |&hi| {
                    let key = PairKey::new(lo, hi)?;
                    self.get(key).map(|marks| (key, marks))
                })
        })
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|a| a.len()).sum::<usize>() / 2
    }
}
