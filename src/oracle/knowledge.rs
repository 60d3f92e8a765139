//! Background knowledge: required and forbidden directed edges.

use crate::error::SearchError;
use crate::store::{Variable, VariableRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Read-only edge constraints. `is_forbidden(x, y)` forbids `x --> y`;
/// `is_required(x, y)` demands it.
pub trait Knowledge: Sync {
    fn is_forbidden(&self, x: &Variable, y: &Variable) -> bool;
    fn is_required(&self, x: &Variable, y: &Variable) -> bool;

    /// True if no edge between `x` and `y` is required in either direction.
    fn no_edge_required(&self, x: &Variable, y: &Variable) -> bool {
        !self.is_required(x, y) && !self.is_required(y, x)
    }
}

/// Knowledge that constrains nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKnowledge;

impl Knowledge for NoKnowledge {
    fn is_forbidden(&self, _x: &Variable, _y: &Variable) -> bool { false }
    fn is_required(&self, _x: &Variable, _y: &Variable) -> bool { false }
}

/// Name-keyed set of edge constraints, stored as `from -> {to}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSet {
    required: BTreeMap<String, BTreeSet<String>>,
    forbidden: BTreeMap<String, BTreeSet<String>>,
}

fn contains(edges: &BTreeMap<String, BTreeSet<String>>, from: &str, to: &str) -> bool {
    edges.get(from).is_some_and(|targets| targets.contains(to))
}

impl KnowledgeSet {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.required.is_empty() && self.forbidden.is_empty() }

    pub fn require(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.required.entry(from.into()).or_default().insert(to.into());
        self
    }

    pub fn forbid(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.forbidden.entry(from.into()).or_default().insert(to.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, SearchError> {
        serde_json::from_str(json).map_err(|e| SearchError::InvalidConfiguration(e.to_string()))
    }
}

impl Knowledge for KnowledgeSet {
    fn is_forbidden(&self, x: &Variable, y: &Variable) -> bool {
        contains(&self.forbidden, &x.name, &y.name)
    }

    fn is_required(&self, x: &Variable, y: &Variable) -> bool {
        contains(&self.required, &x.name, &y.name)
    }
}

/// Rejects knowledge that requires a directed edge it also forbids, or that
/// requires an edge in both directions.
pub fn validate<K: Knowledge + ?Sized>(knowledge: &K, registry: &VariableRegistry) -> Result<(), SearchError> {
    for x in registry.variables() {
        for y in registry.variables() {
            if x.name == y.name || !knowledge.is_required(x, y) {
                continue;
            }
            if knowledge.is_forbidden(x, y) || knowledge.is_required(y, x) {
                return Err(SearchError::InconsistentKnowledge { from: x.name.clone(), to: y.name.clone() });
            }
        }
    }
    Ok(())
}
