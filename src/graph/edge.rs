//! Endpoint marks carried by an edge.

use crate::store::NodeId;
use serde::{Deserialize, Serialize};

/// The mark at one end of an edge.
///
/// A freshly adjacent pair carries `Unoriented` at both ends. Orientation only ever
/// moves an end from `Unoriented` to `Tail` or `Arrow`; an arrowhead is never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Endpoint {
    #[default]
    Unoriented,
    Tail,
    Arrow,
}

/// Marks of one edge, keyed by the canonical `(lo, hi)` order of its `PairKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EdgeMarks {
    pub at_lo: Endpoint,
    pub at_hi: Endpoint,
}

impl EdgeMarks {
    pub fn is_undirected(&self) -> bool {
        self.at_lo == Endpoint::Unoriented && self.at_hi == Endpoint::Unoriented
    }
}

/// How an edge reads from the outside, independent of the internal key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeKind {
    Undirected { x: NodeId, y: NodeId },
    Directed { from: NodeId, to: NodeId },
}
