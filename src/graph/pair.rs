//! Canonical keys for variable pairs and triples.

use crate::store::NodeId;
use serde::{Deserialize, Serialize};

/// Unordered pair of distinct variables, stored as `(lo, hi)` with `lo < hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    lo: NodeId,
    hi: NodeId,
}

impl PairKey {
    /// Returns `None` for a self-pair, which never carries an edge.
    pub fn new(x: NodeId, y: NodeId) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { lo: x, hi: y }),
            std::cmp::Ordering::Greater => Some(Self { lo: y, hi: x }),
            std::cmp::Ordering::Equal => None,
        }
    }

    #[inline(always)]
    pub fn lo(&self) -> NodeId { self.lo }
    #[inline(always)]
    pub fn hi(&self) -> NodeId { self.hi }

    pub fn contains(&self, n: NodeId) -> bool { self.lo == n || self.hi == n }

    /// Position of the pair in a dense upper-triangular layout over `n` nodes.
    #[inline(always)]
    pub fn slot(&self, n: usize) -> usize {
        let i = self.lo.index();
        let j = self.hi.index();
        i * n - i * (i + 1) / 2 + (j - i - 1)
    }

    pub fn slot_count(n: usize) -> usize { n * n.saturating_sub(1) / 2 }
}

/// Path `a - b - c` through the middle node `b`. The endpoints are kept sorted so
/// that `(a, b, c)` and `(c, b, a)` name the same triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
}

impl Triple {
    pub fn new(a: NodeId, b: NodeId, c: NodeId) -> Self {
        if a <= c { Self { a, b, c } } else { Self { a: c, b, c: a } }
    }
}
