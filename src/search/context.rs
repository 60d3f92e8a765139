//! State shared by every phase of one search run.

use super::cancel::CancellationToken;
use crate::analysis::telemetry::SearchTelemetry;
use crate::config::SearchConfig;
use crate::error::OracleError;
use crate::oracle::{IndependenceOracle, Knowledge, TestResult};
use crate::store::{NodeId, Variable, VariableRegistry};
use rayon::prelude::*;
use tracing::trace;

pub struct SearchContext<'a> {
    pub oracle: &'a dyn IndependenceOracle,
    pub knowledge: &'a dyn Knowledge,
    pub registry: &'a VariableRegistry,
    pub config: &'a SearchConfig,
    /// Resolved significance level for FDR cutoffs and, when configured,
    /// single-test verdicts.
    pub alpha: f64,
    pub cancel: &'a CancellationToken,
    pub telemetry: &'a SearchTelemetry,
}

impl<'a> SearchContext<'a> {
    pub fn depth(&self) -> usize { self.config.effective_depth() }

    pub fn variable(&self, id: NodeId) -> &Variable { self.registry.get(id) }

    pub fn is_cancelled(&self) -> bool { self.cancel.is_cancelled() }

    pub fn run_test(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> Result<TestResult, OracleError> {
        self.telemetry.record_test();
        let result = self.oracle.test(x, y, z)?;
        trace!(
            x = self.registry.name(x),
            y = self.registry.name(y),
            z = ?z.iter().map(|&n| self.registry.name(n)).collect::<Vec<_>>(),
            p = result.p_value,
            independent = result.independent,
            "independence test"
        );
        Ok(result)
    }

    /// A configured alpha overrides the oracle's own verdict.
    pub fn is_independent(&self, result: &TestResult) -> bool {
        match self.config.alpha {
            Some(_) => result.p_value > self.alpha,
            None => result.independent,
        }
    }

    /// Maps `f` over `items`, on the rayon pool when the run is parallel.
    /// Results come back in input order either way.
    pub fn map_jobs<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.config.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}
