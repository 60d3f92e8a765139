//! The full search: skeleton, triple classification, orientation.

use super::adjacency;
use super::cancel::CancellationToken;
use super::context::SearchContext;
use super::orient::{self, OrientationReport};
use super::triples::{self, ClassifiedTriple, TripleVerdict};
use crate::analysis::telemetry::{SearchTelemetry, TelemetryReport};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::graph::{GraphSnapshot, PairKey, PatternGraph, Triple};
use crate::oracle::{knowledge, IndependenceOracle, Knowledge, NoKnowledge};
use crate::sepset::SepsetMap;
use crate::store::{NodeId, VariableRegistry};
use std::collections::BTreeSet;
use tracing::info;

/// Builder for one search run.
///
/// ```ignore
/// let outcome = CpcSearch::new(&oracle)
///     .with_config(SearchConfig { depth: 2, ..Default::default() })
///     .with_knowledge(&knowledge)
///     .search()?;
/// println!("{}", outcome.graph.display(&outcome.registry));
/// ```
pub struct CpcSearch<'a> {
    oracle: &'a dyn IndependenceOracle,
    knowledge: &'a dyn Knowledge,
    config: SearchConfig,
    cancel: CancellationToken,
}

/// Everything a finished (or cancelled) run produced.
#[derive(Debug)]
pub struct SearchOutcome {
    pub registry: VariableRegistry,
    pub graph: PatternGraph,
    /// The conditioning set that justified each removed edge.
    pub sepsets: SepsetMap,
    /// Every classified unshielded triple, in classification order.
    pub triples: Vec<ClassifiedTriple>,
    /// Pairs left adjacent because the oracle could not judge them.
    pub failed_pairs: BTreeSet<PairKey>,
    /// Triples left unclassified for the same reason.
    pub failed_triples: Vec<Triple>,
    pub orientation: OrientationReport,
    /// True if the run stopped early. `graph` is then the last consistent state.
    pub cancelled: bool,
    pub telemetry: TelemetryReport,
}

impl<'a> CpcSearch<'a> {
    pub fn new(oracle: &'a dyn IndependenceOracle) -> Self {
        Self { oracle, knowledge: &NoKnowledge, config: SearchConfig::default(), cancel: CancellationToken::new() }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_knowledge(mut self, knowledge: &'a dyn Knowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// Shares `token` with the run; cancelling it stops the search at the next
    /// conditioning set or triple.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn search(&self) -> Result<SearchOutcome, SearchError> {
        self.config.validate()?;
        let registry = VariableRegistry::from_variables(self.oracle.variables())?;
        let alpha = self.config.resolve_alpha(self.oracle.alpha())?;
        knowledge::validate(self.knowledge, &registry)?;

        let telemetry = SearchTelemetry::new();
        let ctx = SearchContext {
            oracle: self.oracle,
            knowledge: self.knowledge,
            registry: &registry,
            config: &self.config,
            alpha,
            cancel: &self.cancel,
            telemetry: &telemetry,
        };
        let phases = run_phases(&ctx)?;

        let telemetry = telemetry.report();
        info!(
            edges = phases.graph.edge_count(),
            tests = telemetry.independence_tests,
            cancelled = phases.cancelled,
            elapsed_ms = telemetry.elapsed.as_millis() as u64,
            "search finished"
        );
        Ok(SearchOutcome {
            registry,
            graph: phases.graph,
            sepsets: phases.sepsets,
            triples: phases.triples,
            failed_pairs: phases.failed_pairs,
            failed_triples: phases.failed_triples,
            orientation: phases.orientation,
            cancelled: phases.cancelled,
            telemetry,
        })
    }
}

struct Phases {
    graph: PatternGraph,
    sepsets: SepsetMap,
    triples: Vec<ClassifiedTriple>,
    failed_pairs: BTreeSet<PairKey>,
    failed_triples: Vec<Triple>,
    orientation: OrientationReport,
    cancelled: bool,
}

fn run_phases(ctx: &SearchContext<'_>) -> Result<Phases, SearchError> {
    let mut phases = Phases {
        graph: PatternGraph::complete(ctx.registry.count()),
        sepsets: SepsetMap::new(),
        triples: Vec::new(),
        failed_pairs: BTreeSet::new(),
        failed_triples: Vec::new(),
        orientation: OrientationReport::default(),
        cancelled: false,
    };

    let adjacency = adjacency::search(ctx, &mut phases.graph, &mut phases.sepsets)?;
    phases.failed_pairs = adjacency.failed_pairs;
    if adjacency.cancelled {
        phases.cancelled = true;
        return Ok(phases);
    }

    let classified = triples::classify(ctx, &phases.graph)?;
    phases.triples = classified.classified;
    phases.failed_triples = classified.failed;
    if classified.cancelled {
        phases.cancelled = true;
        return Ok(phases);
    }

    phases.orientation = orient::orient(ctx, &mut phases.graph, &phases.triples);
    phases.cancelled = phases.orientation.cancelled;
    Ok(phases)
}

impl SearchOutcome {
    pub fn snapshot(&self) -> GraphSnapshot { self.graph.snapshot(&self.registry) }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    /// The verdict reached for the unshielded triple `a - b - c`, if it was classified.
    pub fn verdict(&self, a: NodeId, b: NodeId, c: NodeId) -> Option<TripleVerdict> {
        let wanted = Triple::new(a, b, c);
        self.triples.iter().find(|t| t.triple() == wanted).map(|t| t.verdict)
    }

    /// Same as [`SearchOutcome::verdict`], by variable name.
    pub fn verdict_by_name(&self, a: &str, b: &str, c: &str) -> Result<Option<TripleVerdict>, SearchError> {
        Ok(self.verdict(self.registry.id_of(a)?, self.registry.id_of(b)?, self.registry.id_of(c)?))
    }

    /// Whether the final graph holds `from --> to`, by variable name.
    pub fn has_directed_edge(&self, from: &str, to: &str) -> Result<bool, SearchError> {
        Ok(self.graph.is_directed(self.registry.id_of(from)?, self.registry.id_of(to)?))
    }

    pub fn has_undirected_edge(&self, x: &str, y: &str) -> Result<bool, SearchError> {
        Ok(self.graph.is_undirected(self.registry.id_of(x)?, self.registry.id_of(y)?))
    }

    pub fn is_adjacent(&self, x: &str, y: &str) -> Result<bool, SearchError> {
        Ok(self.graph.is_adjacent(self.registry.id_of(x)?, self.registry.id_of(y)?))
    }
}
