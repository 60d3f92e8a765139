//! Capabilities the search consumes from the outside: independence judgments and
//! background knowledge.
pub mod dsep;
pub mod knowledge;

pub use dsep::DSeparationOracle;
pub use knowledge::{Knowledge, KnowledgeSet, NoKnowledge};

use crate::error::OracleError;
use crate::store::{NodeId, Variable};

/// Outcome of one conditional independence test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    pub p_value: f64,
    pub independent: bool,
}

/// A conditional independence test over a fixed dataset.
///
/// Implementations must be deterministic for identical `(x, y, z)` and must be safe
/// to call from several worker threads at once.
pub trait IndependenceOracle: Sync {
    /// The variables of the dataset, in the order that defines their `NodeId`s.
    fn variables(&self) -> &[Variable];

    /// Significance level at which `TestResult::independent` is decided.
    fn alpha(&self) -> f64;

    /// Tests `x _||_ y | z`.
    fn test(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> Result<TestResult, OracleError>;
}

impl<O: IndependenceOracle + ?Sized> IndependenceOracle for &O {
    fn variables(&self) -> &[Variable] { (**self).variables() }
    fn alpha(&self) -> f64 { (**self).alpha() }
    fn test(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> Result<TestResult, OracleError> {
        (**self).test(x, y, z)
    }
}
