//! Classification of unshielded triples from pooled p-values.

use super::adjacency::gather_p_values;
use super::context::SearchContext;
use crate::error::{OracleError, SearchError};
use crate::graph::{PairKey, PatternGraph, Triple};
use crate::sepset::{Combinations, PValueList, SepsetAggregator};
use crate::store::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripleVerdict {
    Collider,
    NonCollider,
    Ambiguous,
    Neither,
}

impl TripleVerdict {
    /// Decision table over the two aggregated verdicts.
    pub fn from_evidence(contains_b_supportable: bool, excludes_b_supportable: bool) -> Self {
        match (contains_b_supportable, excludes_b_supportable) {
            (true, false) => TripleVerdict::NonCollider,
            (false, true) => TripleVerdict::Collider,
            (true, true) => TripleVerdict::Ambiguous,
            (false, false) => TripleVerdict::Neither,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTriple {
    /// The triple with `a` and `c` as they appear in `b`'s adjacency list.
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
    pub verdict: TripleVerdict,
    pub cutoff_with_b: f64,
    pub cutoff_without_b: f64,
}

impl ClassifiedTriple {
    pub fn triple(&self) -> Triple { Triple::new(self.a, self.b, self.c) }
}

#[derive(Debug, Clone, Default)]
pub struct TripleReport {
    /// Verdicts in classification order.
    pub classified: Vec<ClassifiedTriple>,
    /// Triples skipped after a local oracle failure on their endpoint pair.
    pub failed: Vec<Triple>,
    pub cancelled: bool,
}

/// Unshielded triples `a - b - c` in deterministic order: by `b`, then by the
/// lexicographic index of `{a, c}` in `b`'s sorted adjacency list.
pub fn unshielded_triples(graph: &PatternGraph) -> Vec<(NodeId, NodeId, NodeId)> {
    let mut out = Vec::new();
    for b in graph.nodes() {
        let adjacent = graph.adjacent_nodes(b);
        if adjacent.len() < 2 {
            continue;
        }
        for choice in Combinations::new(adjacent.len(), 2) {
            let (a, c) = (adjacent[choice[0]], adjacent[choice[1]]);
            if !graph.is_adjacent(a, c) {
                out.push((a, b, c));
            }
        }
    }
    out
}

/// Classifies every unshielded triple of `graph`.
///
/// P-values are gathered once per endpoint pair `{a, c}` (in parallel across pairs)
/// and then split by whether each conditioning set contains the middle node.
pub fn classify(ctx: &SearchContext<'_>, graph: &PatternGraph) -> Result<TripleReport, SearchError> {
    let candidates = unshielded_triples(graph);
    info!(candidates = candidates.len(), "classifying unshielded triples");

    let mut pairs: Vec<PairKey> = candidates.iter().filter_map(|&(a, _, c)| PairKey::new(a, c)).collect();
    pairs.sort();
    pairs.dedup();

    let depth = ctx.depth();
    let gathered = ctx.map_jobs(&pairs, |key| gather_p_values(ctx, graph, key.lo(), key.hi(), depth));

    let mut pooled: BTreeMap<PairKey, Result<Option<PValueList>, OracleError>> = BTreeMap::new();
    for (key, result) in pairs.into_iter().zip(gathered) {
        if let Err(e) = &result {
            if e.is_fatal() {
                return Err(e.clone().into());
            }
        }
        pooled.insert(key, result);
    }

    let aggregator = SepsetAggregator::new(ctx.alpha);
    let mut report = TripleReport::default();

    for (a, b, c) in candidates {
        if ctx.is_cancelled() {
            report.cancelled = true;
            break;
        }
        let Some(key) = PairKey::new(a, c) else { continue };
        match pooled.get(&key) {
            Some(Ok(Some(p_values))) => {
                let classified = classify_one(ctx, &aggregator, p_values, a, b, c);
                debug!(
                    a = ctx.registry.name(a),
                    b = ctx.registry.name(b),
                    c = ctx.registry.name(c),
                    verdict = ?classified.verdict,
                    "triple classified"
                );
                report.classified.push(classified);
            }
            Some(Ok(None)) | None => {
                report.cancelled = true;
                break;
            }
            Some(Err(e)) => {
                warn!(
                    a = ctx.registry.name(a),
                    b = ctx.registry.name(b),
                    c = ctx.registry.name(c),
                    error = %e,
                    "oracle failed locally, triple left unclassified"
                );
                ctx.telemetry.record_local_failure();
                report.failed.push(Triple::new(a, b, c));
            }
        }
    }
    Ok(report)
}

fn classify_one(
    ctx: &SearchContext<'_>,
    aggregator: &SepsetAggregator,
    p_values: &PValueList,
    a: NodeId,
    b: NodeId,
    c: NodeId,
) -> ClassifiedTriple {
    let (with_b, without_b) = p_values.partition_by(b);
    let noncollider_evidence = aggregator.decide(&with_b, ctx.config.noncollider_factor);
    let collider_evidence = aggregator.decide(&without_b, ctx.config.collider_factor);
    ClassifiedTriple {
        a,
        b,
        c,
        verdict: TripleVerdict::from_evidence(noncollider_evidence.supportable, collider_evidence.supportable),
        cutoff_with_b: noncollider_evidence.cutoff,
        cutoff_without_b: collider_evidence.cutoff,
    }
}
