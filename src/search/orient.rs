//! Turns triple verdicts into endpoint marks and annotations, then closes the
//! graph under the propagation rules.

use super::context::SearchContext;
use super::meek::MeekRules;
use super::triples::{ClassifiedTriple, TripleVerdict};
use crate::config::NeitherPolicy;
use crate::graph::PatternGraph;
use crate::store::NodeId;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrientationReport {
    pub colliders_oriented: usize,
    /// Collider verdicts left unapplied because they clashed with existing marks,
    /// knowledge, or (with cycle prevention) acyclicity.
    pub collider_conflicts: usize,
    pub closure_orientations: usize,
    pub cancelled: bool,
}

/// Applies verdicts in classification order.
pub fn orient(ctx: &SearchContext<'_>, graph: &mut PatternGraph, verdicts: &[ClassifiedTriple]) -> OrientationReport {
    let rules = MeekRules::new(ctx.knowledge, ctx.registry).with_cycle_prevention(ctx.config.prevent_cycles);
    let mut report = OrientationReport::default();

    let by_knowledge = rules.orient_using_knowledge(graph);
    info!(by_knowledge, verdicts = verdicts.len(), "orienting");

    for v in verdicts {
        if ctx.is_cancelled() {
            report.cancelled = true;
            return report;
        }
        let t = v.triple();
        match v.verdict {
            TripleVerdict::Collider => {
                if orient_collider(&rules, graph, v.a, v.b, v.c) {
                    graph.remove_underline(t);
                    graph.remove_ambiguous(t);
                    report.colliders_oriented += 1;
                    debug!(
                        a = ctx.registry.name(v.a),
                        b = ctx.registry.name(v.b),
                        c = ctx.registry.name(v.c),
                        "collider oriented"
                    );
                } else {
                    report.collider_conflicts += 1;
                    ctx.telemetry.record_collider_conflict();
                    warn!(
                        a = ctx.registry.name(v.a),
                        b = ctx.registry.name(v.b),
                        c = ctx.registry.name(v.c),
                        "collider conflicts with existing orientation, left as is"
                    );
                }
            }
            TripleVerdict::NonCollider => underline(graph, v),
            TripleVerdict::Ambiguous => mark_ambiguous(graph, v),
            TripleVerdict::Neither => match ctx.config.neither_policy {
                NeitherPolicy::NonCollider => underline(graph, v),
                NeitherPolicy::Ambiguous => mark_ambiguous(graph, v),
                NeitherPolicy::Unannotated => {}
            },
        }
    }

    if ctx.is_cancelled() {
        report.cancelled = true;
        return report;
    }
    report.closure_orientations = rules.orient_implied(graph);
    ctx.telemetry.record_closure_orientations(report.closure_orientations);
    info!(
        colliders = report.colliders_oriented,
        conflicts = report.collider_conflicts,
        closure = report.closure_orientations,
        "orientation done"
    );
    report
}

/// Orients `a --> b <-- c` as one step, or not at all.
fn orient_collider(rules: &MeekRules<'_>, graph: &mut PatternGraph, a: NodeId, b: NodeId, c: NodeId) -> bool {
    let current: &PatternGraph = graph;
    let fits = |x: NodeId| {
        current.is_directed(x, b) || (current.is_undirected(x, b) && rules.is_arrow_allowed(current, x, b))
    };
    if !(fits(a) && fits(c)) {
        return false;
    }
    graph.orient(a, b);
    graph.orient(c, b);
    true
}

fn underline(graph: &mut PatternGraph, v: &ClassifiedTriple) {
    let t = v.triple();
    graph.remove_ambiguous(t);
    graph.add_underline(t);
}

fn mark_ambiguous(graph: &mut PatternGraph, v: &ClassifiedTriple) {
    let t = v.triple();
    graph.remove_underline(t);
    graph.add_ambiguous(t);
}
