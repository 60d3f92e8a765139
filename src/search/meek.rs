//! Orientation propagation rules, applied to a fixed point.

use crate::graph::{Endpoint, PatternGraph};
use crate::oracle::Knowledge;
use crate::store::{NodeId, VariableRegistry};
use tracing::trace;

/// Meek's rules R1-R4 under background knowledge.
///
/// Only undirected edges are ever oriented, so an arrowhead placed earlier (by a
/// collider or by knowledge) is never touched. Ambiguous triples count as evidence
/// neither for nor against a collider.
pub struct MeekRules<'a> {
    knowledge: &'a dyn Knowledge,
    registry: &'a VariableRegistry,
    prevent_cycles: bool,
}

impl<'a> MeekRules<'a> {
    pub fn new(knowledge: &'a dyn Knowledge, registry: &'a VariableRegistry) -> Self {
        Self { knowledge, registry, prevent_cycles: false }
    }

    pub fn with_cycle_prevention(mut self, prevent_cycles: bool) -> Self {
        self.prevent_cycles = prevent_cycles;
        self
    }

    /// Orients required edges and reverses forbidden directions on undirected edges.
    /// Returns the number of edges oriented.
    pub fn orient_using_knowledge(&self, graph: &mut PatternGraph) -> usize {
        let edges: Vec<_> = graph.edges().collect();
        let mut oriented = 0;
        for key in edges {
            let (x, y) = (key.lo(), key.hi());
            if !graph.is_undirected(x, y) {
                continue;
            }
            let (vx, vy) = (self.registry.get(x), self.registry.get(y));
            let target = if self.knowledge.is_required(vx, vy) {
                Some((x, y))
            } else if self.knowledge.is_required(vy, vx) {
                Some((y, x))
            } else {
                match (self.knowledge.is_forbidden(vx, vy), self.knowledge.is_forbidden(vy, vx)) {
                    (true, false) => Some((y, x)),
                    (false, true) => Some((x, y)),
                    _ => None,
                }
            };
            if let Some((from, to)) = target {
                if graph.orient(from, to) {
                    trace!(from = self.registry.name(from), to = self.registry.name(to), "oriented by knowledge");
                    oriented += 1;
                }
            }
        }
        oriented
    }

    /// Whether `x --> y` may be placed: no arrowhead already at `x`, knowledge
    /// neither forbids it nor requires the reverse, and (optionally) it closes no
    /// directed cycle.
    pub fn is_arrow_allowed(&self, graph: &PatternGraph, x: NodeId, y: NodeId) -> bool {
        if graph.endpoint(y, x) == Some(Endpoint::Arrow) {
            return false;
        }
        let (vx, vy) = (self.registry.get(x), self.registry.get(y));
        if self.knowledge.is_forbidden(vx, vy) || self.knowledge.is_required(vy, vx) {
            return false;
        }
        !(self.prevent_cycles && graph.has_directed_path(y, x))
    }

    /// Runs knowledge orientation, then R1-R4 until none fires. Returns the number
    /// of edges oriented.
    pub fn orient_implied(&self, graph: &mut PatternGraph) -> usize {
        let mut total = self.orient_using_knowledge(graph);
        loop {
            let fired = self.rule1(graph) + self.rule2(graph) + self.rule3(graph) + self.rule4(graph);
            if fired == 0 {
                break;
            }
            total += fired;
        }
        total
    }

    fn direct(&self, graph: &mut PatternGraph, x: NodeId, y: NodeId, rule: &'static str) -> usize {
        if graph.is_undirected(x, y) && self.is_arrow_allowed(graph, x, y) && graph.orient(x, y) {
            trace!(rule, from = self.registry.name(x), to = self.registry.name(y), "closure orientation");
            1
        } else {
            0
        }
    }

    /// R1: `a --> b --- c`, `a` and `c` non-adjacent  =>  `b --> c`.
    fn rule1(&self, graph: &mut PatternGraph) -> usize {
        let mut fired = 0;
        for b in graph.nodes() {
            for a in graph.parents(b) {
                for c in graph.adjacent_nodes(b) {
                    if c == a || graph.is_adjacent(a, c) || !graph.is_undirected(b, c) || graph.is_ambiguous(a, b, c) {
                        continue;
                    }
                    fired += self.direct(graph, b, c, "R1");
                }
            }
        }
        fired
    }

    /// R2: `a --> b --> c` and `a --- c`  =>  `a --> c`.
    fn rule2(&self, graph: &mut PatternGraph) -> usize {
        let mut fired = 0;
        let edges: Vec<_> = graph.edges().collect();
        for key in edges {
            for (a, c) in [(key.lo(), key.hi()), (key.hi(), key.lo())] {
                if !graph.is_undirected(a, c) {
                    continue;
                }
                let through = graph.children(a).into_iter().any(|b| graph.is_directed(b, c));
                if through {
                    fired += self.direct(graph, a, c, "R2");
                }
            }
        }
        fired
    }

    /// R3: `a --- c --> b`, `a --- d --> b`, `c` and `d` non-adjacent, `a --- b`
    /// =>  `a --> b`.
    fn rule3(&self, graph: &mut PatternGraph) -> usize {
        let mut fired = 0;
        for b in graph.nodes() {
            let parents = graph.parents(b);
            if parents.len() < 2 {
                continue;
            }
            for a in graph.adjacent_nodes(b) {
                if !graph.is_undirected(a, b) {
                    continue;
                }
                let spouses: Vec<NodeId> = parents.iter().copied().filter(|&p| graph.is_undirected(a, p)).collect();
                let found = spouses.iter().enumerate().any(|(i, &c)| {
                    spouses[i + 1..]
                        .iter()
                        .any(|&d| !graph.is_adjacent(c, d) && !graph.is_ambiguous(c, a, d))
                });
                if found {
                    fired += self.direct(graph, a, b, "R3");
                }
            }
        }
        fired
    }

    /// R4: `a --- c --> d --> b`, `a` adjacent to `d`, `c` and `b` non-adjacent,
    /// `a --- b`  =>  `a --> b`.
    fn rule4(&self, graph: &mut PatternGraph) -> usize {
        let mut fired = 0;
        for b in graph.nodes() {
            for d in graph.parents(b) {
                for a in graph.adjacent_nodes(b) {
                    if a == d || !graph.is_undirected(a, b) || !graph.is_adjacent(a, d) {
                        continue;
                    }
                    let found = graph.parents(d).into_iter().any(|c| {
                        c != a && c != b && graph.is_undirected(a, c) && !graph.is_adjacent(c, b) && !graph.is_ambiguous(c, a, b)
                    });
                    if found {
                        fired += self.direct(graph, a, b, "R4");
                    }
                }
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Triple;
    use crate::oracle::{KnowledgeSet, NoKnowledge};
    use crate::store::Variable;

    fn registry(n: usize) -> VariableRegistry {
        let names: Vec<Variable> = (0..n).map(|i| Variable::continuous(format!("X{}", i))).collect();
        VariableRegistry::from_variables(&names).unwrap()
    }

    fn n(i: u32) -> NodeId { NodeId(i) }

    /// Graph over `size` nodes holding only the listed undirected edges.
    fn graph_with(size: usize, edges: &[(u32, u32)]) -> PatternGraph {
        let mut g = PatternGraph::complete(size);
        for i in 0..size as u32 {
            for j in (i + 1)..size as u32 {
                if !edges.contains(&(i, j)) && !edges.contains(&(j, i)) {
                    g.remove_edge(n(i), n(j));
                }
            }
        }
        g
    }

    #[test]
    fn test_rule1_propagates_away_from_arrow() {
        let reg = registry(3);
        let mut g = graph_with(3, &[(0, 1), (1, 2)]);
        g.orient(n(0), n(1));
        let fired = MeekRules::new(&NoKnowledge, &reg).orient_implied(&mut g);
        assert_eq!(fired, 1);
        assert!(g.is_directed(n(1), n(2)));
    }

    #[test]
    fn test_rule1_skips_ambiguous_triples() {
        let reg = registry(3);
        let mut g = graph_with(3, &[(0, 1), (1, 2)]);
        g.orient(n(0), n(1));
        g.add_ambiguous(Triple::new(n(0), n(1), n(2)));
        MeekRules::new(&NoKnowledge, &reg).orient_implied(&mut g);
        assert!(g.is_undirected(n(1), n(2)));
    }

    #[test]
    fn test_rule2_avoids_cycles() {
        let reg = registry(3);
        let mut g = graph_with(3, &[(0, 1), (1, 2), (0, 2)]);
        g.orient(n(0), n(1));
        g.orient(n(1), n(2));
        MeekRules::new(&NoKnowledge, &reg).orient_implied(&mut g);
        assert!(g.is_directed(n(0), n(2)));
    }

    #[test]
    fn test_rule3_two_parents() {
        // 1 --> 3 <-- 2, 0 --- 1, 0 --- 2, 0 --- 3, 1 and 2 non-adjacent.
        let reg = registry(4);
        let mut g = graph_with(4, &[(0, 1), (0, 2), (0, 3), (1, 3), (2, 3)]);
        g.orient(n(1), n(3));
        g.orient(n(2), n(3));
        MeekRules::new(&NoKnowledge, &reg).orient_implied(&mut g);
        assert!(g.is_directed(n(0), n(3)));
        assert!(g.is_undirected(n(0), n(1)));
    }

    #[test]
    fn test_rule4_chain() {
        // a=0, c=1, d=2, b=3: 0 --- 1 --> 2 --> 3, 0 --- 2, 0 --- 3, 1 and 3 non-adjacent.
        let reg = registry(4);
        let mut g = graph_with(4, &[(0, 1), (1, 2), (2, 3), (0, 2), (0, 3)]);
        g.orient(n(1), n(2));
        g.orient(n(2), n(3));
        let rules = MeekRules::new(&NoKnowledge, &reg);
        assert_eq!(rules.rule4(&mut g), 1);
        assert!(g.is_directed(n(0), n(3)));
    }

    #[test]
    fn test_knowledge_orients_and_blocks() {
        let reg = registry(3);
        let mut k = KnowledgeSet::new();
        k.require("X0", "X1").forbid("X1", "X2");
        let mut g = graph_with(3, &[(0, 1), (1, 2)]);
        MeekRules::new(&k, &reg).orient_implied(&mut g);
        assert!(g.is_directed(n(0), n(1)));
        // R1 would give 1 --> 2, knowledge flips it.
        assert!(g.is_directed(n(2), n(1)));
        assert!(!g.is_directed(n(1), n(2)));
    }

    #[test]
    fn test_cycle_prevention() {
        let reg = registry(3);
        let mut g = graph_with(3, &[(0, 1), (1, 2), (0, 2)]);
        g.orient(n(0), n(1));
        g.orient(n(1), n(2));
        let rules = MeekRules::new(&NoKnowledge, &reg).with_cycle_prevention(true);
        assert!(!rules.is_arrow_allowed(&g, n(2), n(0)));
        assert!(rules.is_arrow_allowed(&g, n(0), n(2)));
    }

    #[test]
    fn test_closure_is_idempotent() {
        let reg = registry(3);
        let mut g = graph_with(3, &[(0, 1), (1, 2)]);
        g.orient(n(0), n(1));
        let rules = MeekRules::new(&NoKnowledge, &reg);
        rules.orient_implied(&mut g);
        let once = g.clone();
        assert_eq!(rules.orient_implied(&mut g), 0);
        assert_eq!(g, once);
    }
}
