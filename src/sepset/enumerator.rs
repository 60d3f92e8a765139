//! Candidate conditioning sets for a pair, drawn from the endpoints' neighbourhoods.

use super::CondSet;
use crate::graph::PatternGraph;
use crate::store::NodeId;
use smallvec::SmallVec;

/// Lexicographic `k`-combinations of `0..n`.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    k: usize,
    current: Option<SmallVec<[usize; 8]>>,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        let current = if k <= n { Some((0..k).collect()) } else { None };
        Self { n, k, current }
    }
}

impl Iterator for Combinations {
    type Item = SmallVec<[usize; 8]>;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.current.clone()?;

        // Advance: bump the rightmost index that still has room, reset the tail.
        let mut next = out.clone();
        let mut i = self.k;
        loop {
            if i == 0 {
                self.current = None;
                break;
            }
            i -= 1;
            if next[i] < self.n - self.k + i {
                next[i] += 1;
                for j in (i + 1)..self.k {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                break;
            }
        }
        Some(out)
    }
}

/// Snapshot of the two neighbourhoods of a pair `(a, c)`, each excluding the other
/// endpoint. Iteration never touches the graph again, so it is restartable and
/// sees the graph as it was when the enumerator was built.
#[derive(Debug, Clone)]
pub struct ConditioningSetEnumerator {
    from_a: Vec<NodeId>,
    from_c: Vec<NodeId>,
    depth: usize,
}

impl ConditioningSetEnumerator {
    pub fn new(graph: &PatternGraph, a: NodeId, c: NodeId, depth: usize) -> Self {
        let from_a = graph.adjacent_nodes(a).into_iter().filter(|&n| n != c).collect();
        let from_c = graph.adjacent_nodes(c).into_iter().filter(|&n| n != a).collect();
        Self { from_a, from_c, depth }
    }

    pub fn from_neighbourhoods(from_a: Vec<NodeId>, from_c: Vec<NodeId>, depth: usize) -> Self {
        Self { from_a, from_c, depth }
    }

    pub fn neighbourhoods(&self) -> (&[NodeId], &[NodeId]) { (&self.from_a, &self.from_c) }

    /// Every set of size `0..=depth` from `a`'s side, then from `c`'s side.
    /// Sets found on both sides appear twice.
    pub fn iter(&self) -> impl Iterator<Item = CondSet> + '_ {
        stream(&self.from_a, self.depth).chain(stream(&self.from_c, self.depth))
    }

    /// Sets of exactly `size` elements, `a`'s side first. Empty past the depth bound.
    pub fn of_size(&self, size: usize) -> impl Iterator<Item = CondSet> + '_ {
        let limit = if size <= self.depth { usize::MAX } else { 0 };
        sized(&self.from_a, size).chain(sized(&self.from_c, size)).take(limit)
    }
}

fn stream(pool: &[NodeId], depth: usize) -> impl Iterator<Item = CondSet> + '_ {
    (0..=depth.min(pool.len())).flat_map(move |size| sized(pool, size))
}

fn sized(pool: &[NodeId], size: usize) -> impl Iterator<Item = CondSet> + '_ {
    Combinations::new(pool.len(), size).map(move |idx| idx.iter().map(|&i| pool[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(4, 0, 1)]
    #[case(4, 1, 4)]
    #[case(4, 2, 6)]
    #[case(4, 4, 1)]
    #[case(3, 4, 0)]
    #[case(0, 0, 1)]
    fn test_combination_counts(#[case] n: usize, #[case] k: usize, #[case] expected: usize) {
        assert_eq!(Combinations::new(n, k).count(), expected);
    }

    #[test]
    fn test_combinations_are_lexicographic() {
        let all: Vec<Vec<usize>> = Combinations::new(4, 2).map(|c| c.to_vec()).collect();
        assert_eq!(all, vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]]);
    }

    fn ids(v: &[u32]) -> Vec<NodeId> { v.iter().map(|&i| NodeId(i)).collect() }

    #[test]
    fn test_enumerator_excludes_other_endpoint() {
        let g = PatternGraph::complete(4);
        let e = ConditioningSetEnumerator::new(&g, NodeId(0), NodeId(1), 1);
        let (a, c) = e.neighbourhoods();
        assert_eq!(a, ids(&[2, 3]).as_slice());
        assert_eq!(c, ids(&[2, 3]).as_slice());
    }

    #[test]
    fn test_enumerator_orders_by_size_then_side() {
        let e = ConditioningSetEnumerator::from_neighbourhoods(ids(&[2, 3]), ids(&[4]), 2);
        let sets: Vec<Vec<NodeId>> = e.iter().map(|s| s.to_vec()).collect();
        assert_eq!(
            sets,
            vec![
                ids(&[]),
                ids(&[2]),
                ids(&[3]),
                ids(&[2, 3]),
                ids(&[]),
                ids(&[4]),
            ]
        );
        // Restartable: a second pass yields the same sequence.
        assert_eq!(e.iter().count(), sets.len());
    }

    #[test]
    fn test_depth_bounds_set_size() {
        let e = ConditioningSetEnumerator::from_neighbourhoods(ids(&[1, 2, 3]), ids(&[]), 1);
        assert!(e.iter().all(|s| s.len() <= 1));
        assert_eq!(e.iter().count(), 1 + 3 + 1);
        assert_eq!(e.of_size(2).count(), 0);
        assert_eq!(e.of_size(1).count(), 3);
    }
}
