//! pattern.rs
//! The search graph: edge arena plus triple annotations, with the queries the
//! search phases and downstream consumers need.

use super::edge::{EdgeKind, EdgeMarks, Endpoint};
use super::pair::{PairKey, Triple};
use super::storage::EdgeArena;
use crate::store::{NodeId, VariableRegistry};
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

/// A partially oriented graph over the registered variables.
///
/// Mutators are crate-private: once a search returns, consumers only query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternGraph {
    arena: EdgeArena,
    underlines: BTreeSet<Triple>,
    ambiguous: BTreeSet<Triple>,
}

impl PatternGraph {
    pub fn empty(node_count: usize) -> Self {
        Self { arena: EdgeArena::empty(node_count), ..Default::default() }
    }

    pub fn complete(node_count: usize) -> Self {
        Self { arena: EdgeArena::complete(node_count), ..Default::default() }
    }

    pub fn node_count(&self) -> usize { self.arena.node_count() }
    pub fn edge_count(&self) -> usize { self.arena.edge_count() }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count()).map(NodeId::new)
    }

    // --- Adjacency ---

    pub fn is_adjacent(&self, x: NodeId, y: NodeId) -> bool {
        PairKey::new(x, y).is_some_and(|k| self.arena.get(k).is_some())
    }

    /// Neighbours of `x` in ascending id order.
    pub fn adjacent_nodes(&self, x: NodeId) -> Vec<NodeId> {
        self.arena.neighbours(x).iter().copied().collect()
    }

    pub fn degree(&self, x: NodeId) -> usize { self.arena.neighbours(x).len() }

    /// Present edges, ascending by pair key.
    pub fn edges(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.arena.iter().map(|(k, _)| k)
    }

    /// Largest `|adj(x) \ {y}|` over all edges `x - y`: the biggest conditioning set
    /// any remaining edge can still be tested against.
    pub fn free_degree(&self) -> usize {
        self.nodes()
            .map(|x| self.degree(x).saturating_sub(1))
            .max()
            .unwrap_or(0)
    }

    // --- Endpoints ---

    pub fn marks(&self, x: NodeId, y: NodeId) -> Option<EdgeMarks> {
        PairKey::new(x, y).and_then(|k| self.arena.get(k).copied())
    }

    /// The mark at `y` on the edge `x - y`.
    pub fn endpoint(&self, x: NodeId, y: NodeId) -> Option<Endpoint> {
        let key = PairKey::new(x, y)?;
        let marks = self.arena.get(key)?;
        Some(if key.lo() == y { marks.at_lo } else { marks.at_hi })
    }

    pub fn is_directed(&self, from: NodeId, to: NodeId) -> bool {
        self.endpoint(to, from) == Some(Endpoint::Tail) && self.endpoint(from, to) == Some(Endpoint::Arrow)
    }

    pub fn is_undirected(&self, x: NodeId, y: NodeId) -> bool {
        self.marks(x, y).is_some_and(|m| m.is_undirected())
    }

    pub fn edge_kind(&self, x: NodeId, y: NodeId) -> Option<EdgeKind> {
        let key = PairKey::new(x, y)?;
        let marks = self.arena.get(key)?;
        let (lo, hi) = (key.lo(), key.hi());
        Some(match (marks.at_lo, marks.at_hi) {
            (_, Endpoint::Arrow) => EdgeKind::Directed { from: lo, to: hi },
            (Endpoint::Arrow, _) => EdgeKind::Directed { from: hi, to: lo },
            _ => EdgeKind::Undirected { x: lo, y: hi },
        })
    }

    pub fn parents(&self, x: NodeId) -> Vec<NodeId> {
        self.arena.neighbours(x).iter().copied().filter(|&p| self.is_directed(p, x)).collect()
    }

    pub fn children(&self, x: NodeId) -> Vec<NodeId> {
        self.arena.neighbours(x).iter().copied().filter(|&c| self.is_directed(x, c)).collect()
    }

    // --- Triple annotations ---

    pub fn is_underline(&self, a: NodeId, b: NodeId, c: NodeId) -> bool {
        self.underlines.contains(&Triple::new(a, b, c))
    }

    pub fn is_ambiguous(&self, a: NodeId, b: NodeId, c: NodeId) -> bool {
        self.ambiguous.contains(&Triple::new(a, b, c))
    }

    pub fn underline_triples(&self) -> impl Iterator<Item = &Triple> { self.underlines.iter() }
    pub fn ambiguous_triples(&self) -> impl Iterator<Item = &Triple> { self.ambiguous.iter() }

    /// Ambiguous triples whose middle node is `b`.
    pub fn ambiguous_triples_of(&self, b: NodeId) -> Vec<Triple> {
        self.ambiguous.iter().filter(|t| t.b == b).copied().collect()
    }

    // --- Paths ---

    /// True if a directed path `from ⇝ to` of length >= 1 exists.
    pub fn has_directed_path(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from(self.children(from));
        while let Some(node) = queue.pop_front() {
            if node == to {
                return true;
            }
            if visited.insert(node) {
                queue.extend(self.children(node));
            }
        }
        false
    }

    /// The directed part of the graph as a petgraph map, one node per variable.
    pub fn directed_view(&self) -> DiGraphMap<NodeId, ()> {
        let mut view = DiGraphMap::with_capacity(self.node_count(), self.edge_count());
        for n in self.nodes() {
            view.add_node(n);
        }
        for key in self.edges() {
            if let Some(EdgeKind::Directed { from, to }) = self.edge_kind(key.lo(), key.hi()) {
                view.add_edge(from, to, ());
            }
        }
        view
    }

    // --- Mutation (search phases only) ---

    pub(crate) fn remove_edge(&mut self, x: NodeId, y: NodeId) -> bool {
        let Some(key) = PairKey::new(x, y) else { return false };
        if self.arena.remove(key).is_none() {
            return false;
        }
        self.underlines.retain(|t| !(t.b == x && (t.a == y || t.c == y)) && !(t.b == y && (t.a == x || t.c == x)));
        self.ambiguous.retain(|t| !(t.b == x && (t.a == y || t.c == y)) && !(t.b == y && (t.a == x || t.c == x)));
        true
    }

    /// Sets the mark at `y` on `x - y`, only if that end is still unoriented.
    /// Returns whether the mark changed.
    pub(crate) fn set_endpoint(&mut self, x: NodeId, y: NodeId, mark: Endpoint) -> bool {
        let Some(key) = PairKey::new(x, y) else { return false };
        let Some(marks) = self.arena.get_mut(key) else { return false };
        let slot = if key.lo() == y { &mut marks.at_lo } else { &mut marks.at_hi };
        if *slot == Endpoint::Unoriented && mark != Endpoint::Unoriented {
            *slot = mark;
            true
        } else {
            false
        }
    }

    /// Orients `x --> y` if neither end is already marked the other way.
    pub(crate) fn orient(&mut self, x: NodeId, y: NodeId) -> bool {
        match (self.endpoint(y, x), self.endpoint(x, y)) {
            (Some(Endpoint::Unoriented | Endpoint::Tail), Some(Endpoint::Unoriented | Endpoint::Arrow)) => {
                let tail = self.set_endpoint(y, x, Endpoint::Tail);
                let arrow = self.set_endpoint(x, y, Endpoint::Arrow);
                tail || arrow
            }
            _ => false,
        }
    }

    pub(crate) fn add_underline(&mut self, t: Triple) { self.underlines.insert(t); }
    pub(crate) fn remove_underline(&mut self, t: Triple) { self.underlines.remove(&t); }
    pub(crate) fn add_ambiguous(&mut self, t: Triple) { self.ambiguous.insert(t); }
    pub(crate) fn remove_ambiguous(&mut self, t: Triple) { self.ambiguous.remove(&t); }

    // --- Export ---

    pub fn snapshot(&self, registry: &VariableRegistry) -> GraphSnapshot {
        let name = |n: NodeId| registry.name(n).to_string();
        let edges = self
            .edges()
            .filter_map(|k| self.edge_kind(k.lo(), k.hi()))
            .map(|kind| match kind {
                EdgeKind::Undirected { x, y } => EdgeSnapshot { x: name(x), mark: "---".into(), y: name(y) },
                EdgeKind::Directed { from, to } => EdgeSnapshot { x: name(from), mark: "-->".into(), y: name(to) },
            })
            .collect();
        let triple = |t: &Triple| [name(t.a), name(t.b), name(t.c)];
        GraphSnapshot {
            variables: registry.variables().iter().map(|v| v.name.clone()).collect(),
            edges,
            underlines: self.underlines.iter().map(triple).collect(),
            ambiguous: self.ambiguous.iter().map(triple).collect(),
        }
    }

    pub fn display<'a>(&'a self, registry: &'a VariableRegistry) -> GraphDisplay<'a> {
        GraphDisplay { graph: self, registry }
    }
}

/// Name-keyed, serializable form of a `PatternGraph`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub variables: Vec<String>,
    pub edges: Vec<EdgeSnapshot>,
    pub underlines: Vec<[String; 3]>,
    pub ambiguous: Vec<[String; 3]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub x: String,
    pub mark: String,
    pub y: String,
}

pub struct GraphDisplay<'a> {
    graph: &'a PatternGraph,
    registry: &'a VariableRegistry,
}

impl fmt::Display for GraphDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.graph.snapshot(self.registry);
        writeln!(f, "Graph Nodes:")?;
        writeln!(f, "{}", snapshot.variables.join(";"))?;
        writeln!(f)?;
        writeln!(f, "Graph Edges:")?;
        for (i, e) in snapshot.edges.iter().enumerate() {
            writeln!(f, "{}. {} {} {}", i + 1, e.x, e.mark, e.y)?;
        }
        Ok(())
    }
}
