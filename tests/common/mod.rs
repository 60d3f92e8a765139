#![allow(dead_code)]

use causal_search_core::{
    CancellationToken, DSeparationOracle, IndependenceOracle, NodeId, OracleError, TestResult, Variable,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn vars(names: &[&str]) -> Vec<Variable> {
    names.iter().map(|n| Variable::continuous(*n)).collect()
}

/// A -> C <- B, C -> D
pub fn collider_chain() -> DSeparationOracle {
    DSeparationOracle::from_edges(&vars(&["A", "B", "C", "D"]), &[("A", "C"), ("B", "C"), ("C", "D")]).unwrap()
}

/// Oracle answering from a fixed table; pairs and sets are looked up unordered.
pub struct ScriptedOracle {
    variables: Vec<Variable>,
    alpha: f64,
    default_p: f64,
    table: HashMap<(NodeId, NodeId, Vec<NodeId>), f64>,
}

impl ScriptedOracle {
    /// Every test is dependent (p = 0) unless scripted otherwise.
    pub fn new(names: &[&str]) -> Self {
        Self { variables: vars(names), alpha: 0.05, default_p: 0.0, table: HashMap::new() }
    }

    pub fn id(&self, name: &str) -> NodeId {
        let idx = self.variables.iter().position(|v| v.name == name).unwrap();
        NodeId::new(idx)
    }

    pub fn with_p(mut self, x: &str, y: &str, z: &[&str], p: f64) -> Self {
        let z: Vec<NodeId> = z.iter().map(|n| self.id(n)).collect();
        let key = Self::key(self.id(x), self.id(y), &z);
        self.table.insert(key, p);
        self
    }

    fn key(x: NodeId, y: NodeId, z: &[NodeId]) -> (NodeId, NodeId, Vec<NodeId>) {
        let mut z = z.to_vec();
        z.sort();
        (x.min(y), x.max(y), z)
    }
}

impl IndependenceOracle for ScriptedOracle {
    fn variables(&self) -> &[Variable] { &self.variables }

    fn alpha(&self) -> f64 { self.alpha }

    fn test(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> Result<TestResult, OracleError> {
        let p = self.table.get(&Self::key(x, y, z)).copied().unwrap_or(self.default_p);
        Ok(TestResult { p_value: p, independent: p > self.alpha })
    }
}

/// Wraps an oracle and fails every test of one pair.
pub struct FailingPair<O> {
    pub inner: O,
    pub pair: (NodeId, NodeId),
    pub fatal: bool,
}

impl<O: IndependenceOracle> IndependenceOracle for FailingPair<O> {
    fn variables(&self) -> &[Variable] { self.inner.variables() }

    fn alpha(&self) -> f64 { self.inner.alpha() }

    fn test(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> Result<TestResult, OracleError> {
        let (a, b) = self.pair;
        if (x, y) == (a, b) || (x, y) == (b, a) {
            return Err(if self.fatal {
                OracleError::Unavailable("backend went away".into())
            } else {
                OracleError::Degenerate { x, y, reason: "singular covariance".into() }
            });
        }
        self.inner.test(x, y, z)
    }
}

/// Wraps an oracle and cancels `token` once `budget` tests have run.
pub struct CancelAfter<O> {
    pub inner: O,
    pub token: CancellationToken,
    pub budget: usize,
    pub calls: AtomicUsize,
}

impl<O> CancelAfter<O> {
    pub fn new(inner: O, token: CancellationToken, budget: usize) -> Self {
        Self { inner, token, budget, calls: AtomicUsize::new(0) }
    }
}

impl<O: IndependenceOracle> IndependenceOracle for CancelAfter<O> {
    fn variables(&self) -> &[Variable] { self.inner.variables() }

    fn alpha(&self) -> f64 { self.inner.alpha() }

    fn test(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> Result<TestResult, OracleError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.budget {
            self.token.cancel();
        }
        self.inner.test(x, y, z)
    }
}
