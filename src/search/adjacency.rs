//! Skeleton discovery: removes edges from the complete graph, tier by tier.
//!
//! Each tier freezes the graph, decides every remaining edge against that frozen
//! copy (possibly in parallel), and only then applies the removals in edge-key
//! order. A removal records its sepset and deletes the edge in one step, so a
//! cancelled or failed run always leaves a consistent graph behind.

use super::context::SearchContext;
use crate::analysis::telemetry::TierStats;
use crate::config::AdjacencyStrategy;
use crate::error::{OracleError, SearchError};
use crate::graph::{PairKey, PatternGraph};
use crate::sepset::{CondSet, ConditioningSetEnumerator, PValueList, SepsetAggregator, SepsetMap, SepsetRecord};
use crate::store::NodeId;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// What the adjacency phase left for the caller to know about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyReport {
    /// Pairs whose evaluation was abandoned after a local oracle failure. They stay adjacent.
    pub failed_pairs: BTreeSet<PairKey>,
    pub cancelled: bool,
}

enum EdgeVerdict {
    Keep,
    Remove(SepsetRecord),
    Cancelled,
}

/// Prunes `graph` in place according to the configured strategy.
pub fn search(ctx: &SearchContext<'_>, graph: &mut PatternGraph, sepsets: &mut SepsetMap) -> Result<AdjacencyReport, SearchError> {
    let mut report = AdjacencyReport::default();
    info!(
        variables = graph.node_count(),
        depth = ctx.depth(),
        strategy = ?ctx.config.adjacency,
        "starting adjacency search"
    );

    remove_forbidden_pairs(ctx, graph, sepsets);

    match ctx.config.adjacency {
        AdjacencyStrategy::Stable => stable_pass(ctx, graph, sepsets, &mut report)?,
        AdjacencyStrategy::FdrRefinement => fdr_pass(ctx, graph, sepsets, &mut report)?,
        AdjacencyStrategy::StableThenRefine => {
            stable_pass(ctx, graph, sepsets, &mut report)?;
            if !report.cancelled {
                fdr_pass(ctx, graph, sepsets, &mut report)?;
            }
        }
    }

    info!(edges = graph.edge_count(), removed = sepsets.len(), cancelled = report.cancelled, "finished adjacency search");
    Ok(report)
}

/// Pairs forbidden in both directions cannot be adjacent; they go without a test.
fn remove_forbidden_pairs(ctx: &SearchContext<'_>, graph: &mut PatternGraph, sepsets: &mut SepsetMap) {
    let doomed: Vec<PairKey> = graph
        .edges()
        .filter(|k| {
            let (x, y) = (ctx.variable(k.lo()), ctx.variable(k.hi()));
            ctx.knowledge.is_forbidden(x, y) && ctx.knowledge.is_forbidden(y, x) && ctx.knowledge.no_edge_required(x, y)
        })
        .collect();
    for key in doomed {
        sepsets.set(key.lo(), key.hi(), SepsetRecord::by_knowledge());
        graph.remove_edge(key.lo(), key.hi());
    }
}

/// Fast adjacency search on frozen neighbourhoods: at depth `d`, an edge goes as
/// soon as one size-`d` subset of either endpoint's neighbourhood separates it.
fn stable_pass(
    ctx: &SearchContext<'_>,
    graph: &mut PatternGraph,
    sepsets: &mut SepsetMap,
    report: &mut AdjacencyReport,
) -> Result<(), SearchError> {
    for depth in 0..=ctx.depth() {
        let frozen = graph.clone();
        let edges = testable_edges(ctx, &frozen, report);
        let verdicts = ctx.map_jobs(&edges, |&key| first_separating_set(ctx, &frozen, key, depth));
        let removed = apply(ctx, graph, sepsets, report, &edges, verdicts)?;

        debug!(depth, tested = edges.len(), removed, "stable tier done");
        ctx.telemetry.record_tier(TierStats { pass: "stable", depth, edges_tested: edges.len(), removed });

        if report.cancelled || graph.free_degree() <= depth {
            break;
        }
    }
    Ok(())
}

/// FDR-aggregated tiers: at depth `d`, every subset up to size `d` of both
/// neighbourhoods is tested and the pooled p-values decide the edge.
fn fdr_pass(
    ctx: &SearchContext<'_>,
    graph: &mut PatternGraph,
    sepsets: &mut SepsetMap,
    report: &mut AdjacencyReport,
) -> Result<(), SearchError> {
    let aggregator = SepsetAggregator::new(ctx.alpha);
    for depth in 0..=ctx.depth() {
        let frozen = graph.clone();
        let edges = testable_edges(ctx, &frozen, report);
        let verdicts = ctx.map_jobs(&edges, |&key| pooled_verdict(ctx, &aggregator, &frozen, key, depth));
        let removed = apply(ctx, graph, sepsets, report, &edges, verdicts)?;

        debug!(depth, tested = edges.len(), removed, "fdr tier done");
        ctx.telemetry.record_tier(TierStats { pass: "fdr", depth, edges_tested: edges.len(), removed });

        if report.cancelled || graph.free_degree() <= depth {
            break;
        }
    }
    Ok(())
}

/// Edges still worth testing: present, not abandoned, not required by knowledge.
fn testable_edges(ctx: &SearchContext<'_>, graph: &PatternGraph, report: &AdjacencyReport) -> Vec<PairKey> {
    graph
        .edges()
        .filter(|k| !report.failed_pairs.contains(k))
        .filter(|k| ctx.knowledge.no_edge_required(ctx.variable(k.lo()), ctx.variable(k.hi())))
        .collect()
}

fn first_separating_set(
    ctx: &SearchContext<'_>,
    frozen: &PatternGraph,
    key: PairKey,
    depth: usize,
) -> Result<EdgeVerdict, OracleError> {
    let (x, y) = (key.lo(), key.hi());
    let enumerator = ConditioningSetEnumerator::new(frozen, x, y, depth);
    let mut tried: HashSet<CondSet> = HashSet::new();
    for set in enumerator.of_size(depth) {
        if ctx.is_cancelled() {
            return Ok(EdgeVerdict::Cancelled);
        }
        if !tried.insert(set.clone()) {
            continue;
        }
        let result = ctx.run_test(x, y, &set)?;
        if ctx.is_independent(&result) {
            return Ok(EdgeVerdict::Remove(SepsetRecord::tested(result.p_value, set)));
        }
    }
    Ok(EdgeVerdict::Keep)
}

fn pooled_verdict(
    ctx: &SearchContext<'_>,
    aggregator: &SepsetAggregator,
    frozen: &PatternGraph,
    key: PairKey,
    depth: usize,
) -> Result<EdgeVerdict, OracleError> {
    let (x, y) = (key.lo(), key.hi());
    let p_values = gather_p_values(ctx, frozen, x, y, depth)?;
    let Some(p_values) = p_values else { return Ok(EdgeVerdict::Cancelled) };

    let decision = aggregator.decide(p_values.as_slice(), 1.0);
    Ok(match decision.sepset {
        Some(accepted) if decision.supportable => EdgeVerdict::Remove(SepsetRecord::tested(accepted.p, accepted.sepset)),
        _ => EdgeVerdict::Keep,
    })
}

/// Every distinct `(p, set)` for `x, y` over sets up to `depth` from both
/// neighbourhoods. `None` if cancelled part-way; a partial list is never judged.
pub(crate) fn gather_p_values(
    ctx: &SearchContext<'_>,
    graph: &PatternGraph,
    x: NodeId,
    y: NodeId,
    depth: usize,
) -> Result<Option<PValueList>, OracleError> {
    let enumerator = ConditioningSetEnumerator::new(graph, x, y, depth);
    let mut p_values = PValueList::new();
    let mut tried: HashSet<CondSet> = HashSet::new();
    for set in enumerator.iter() {
        if ctx.is_cancelled() {
            return Ok(None);
        }
        if !tried.insert(set.clone()) {
            continue;
        }
        let result = ctx.run_test(x, y, &set)?;
        p_values.push(result.p_value, set);
    }
    Ok(Some(p_values))
}

/// Applies one tier's verdicts in edge order. Returns the number of removals.
fn apply(
    ctx: &SearchContext<'_>,
    graph: &mut PatternGraph,
    sepsets: &mut SepsetMap,
    report: &mut AdjacencyReport,
    edges: &[PairKey],
    verdicts: Vec<Result<EdgeVerdict, OracleError>>,
) -> Result<usize, SearchError> {
    let mut removed = 0;
    for (&key, verdict) in edges.iter().zip(verdicts) {
        match verdict {
            Ok(EdgeVerdict::Keep) => {}
            Ok(EdgeVerdict::Remove(record)) => {
                sepsets.set(key.lo(), key.hi(), record);
                if graph.remove_edge(key.lo(), key.hi()) {
                    removed += 1;
                }
            }
            Ok(EdgeVerdict::Cancelled) => report.cancelled = true,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(
                    x = ctx.registry.name(key.lo()),
                    y = ctx.registry.name(key.hi()),
                    error = %e,
                    "oracle failed locally, keeping edge"
                );
                ctx.telemetry.record_local_failure();
                report.failed_pairs.insert(key);
            }
        }
    }
    Ok(removed)
}
