//! Turns the p-values gathered for one pair into a single independence verdict.

use super::fdr::fdr_cutoff_sorted;
use super::CondSet;
use crate::store::NodeId;
use std::collections::HashSet;

/// A p-value and the conditioning set that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PValue {
    pub p: f64,
    pub sepset: CondSet,
}

/// The p-values gathered for one pair, without repeats of the same `(p, set)`.
#[derive(Debug, Clone, Default)]
pub struct PValueList {
    values: Vec<PValue>,
    seen: HashSet<(u64, CondSet)>,
}

impl PValueList {
    pub fn new() -> Self { Self::default() }

    /// Returns false if the identical observation was already recorded.
    pub fn push(&mut self, p: f64, sepset: CondSet) -> bool {
        if !self.seen.insert((p.to_bits(), sepset.clone())) {
            return false;
        }
        self.values.push(PValue { p, sepset });
        true
    }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
    pub fn as_slice(&self) -> &[PValue] { &self.values }

    /// Splits into (sets containing `b`, sets excluding `b`), keeping gathering order.
    pub fn partition_by(&self, b: NodeId) -> (Vec<PValue>, Vec<PValue>) {
        self.values.iter().cloned().partition(|v| v.sepset.contains(&b))
    }

    /// Whether the set with the largest p-value contains `b`. Ties go to the set
    /// gathered last among the maximal ones.
    pub fn max_p_sepset_contains(&self, b: NodeId) -> Option<bool> {
        self.values
            .iter()
            .max_by(|x, y| x.p.total_cmp(&y.p))
            .map(|v| v.sepset.contains(&b))
    }
}

/// Outcome of aggregating one list.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Some scaled p-value exceeds the FDR cutoff.
    pub supportable: bool,
    pub cutoff: f64,
    /// The smallest p-value whose scaled value exceeds the cutoff.
    pub sepset: Option<PValue>,
}

impl Decision {
    fn no_evidence() -> Self {
        Self { supportable: false, cutoff: 0.0, sepset: None }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SepsetAggregator {
    alpha: f64,
}

impl SepsetAggregator {
    pub fn new(alpha: f64) -> Self { Self { alpha } }

    pub fn alpha(&self) -> f64 { self.alpha }

    /// FDR-controlled verdict over `values`. `factor` scales each p-value before it is
    /// compared with the cutoff; the cutoff itself is computed on raw p-values.
    pub fn decide(&self, values: &[PValue], factor: f64) -> Decision {
        if values.is_empty() {
            return Decision::no_evidence();
        }
        let mut sorted: Vec<&PValue> = values.iter().collect();
        sorted.sort_by(|x, y| x.p.total_cmp(&y.p).then_with(|| x.sepset.cmp(&y.sepset)));
        let raw: Vec<f64> = sorted.iter().map(|v| v.p).collect();
        let cutoff = fdr_cutoff_sorted(self.alpha, &raw);

        let accepted = sorted.into_iter().find(|v| v.p * factor > cutoff).cloned();
        Decision { supportable: accepted.is_some(), cutoff, sepset: accepted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use smallvec::smallvec;

    fn pv(p: f64, set: &[u32]) -> PValue {
        PValue { p, sepset: set.iter().map(|&i| NodeId(i)).collect() }
    }

    #[test]
    fn test_empty_input_is_no_evidence() {
        let d = SepsetAggregator::new(0.05).decide(&[], 1.0);
        assert!(!d.supportable);
        assert!(d.sepset.is_none());
    }

    #[test]
    fn test_single_large_p_value_supports_independence() {
        let d = SepsetAggregator::new(0.05).decide(&[pv(0.4, &[2])], 1.0);
        assert!(d.supportable);
        assert_eq!(d.sepset, Some(pv(0.4, &[2])));
    }

    #[test]
    fn test_all_rejected_means_dependent() {
        let d = SepsetAggregator::new(0.05).decide(&[pv(0.0, &[]), pv(0.001, &[1])], 1.0);
        assert!(!d.supportable);
        assert_eq!(d.cutoff, 0.001);
    }

    #[test]
    fn test_accepted_sepset_is_smallest_surviving_p() {
        let values = [pv(0.9, &[3]), pv(0.0, &[]), pv(0.2, &[1]), pv(0.5, &[2])];
        let d = SepsetAggregator::new(0.05).decide(&values, 1.0);
        assert_eq!(d.cutoff, 0.0);
        assert_eq!(d.sepset, Some(pv(0.2, &[1])));
    }

    #[test]
    fn test_factor_tightens_the_bar() {
        // cutoff = 0.024; 0.055 clears it raw but not once scaled by 0.4.
        let agg = SepsetAggregator::new(0.05);
        let values = [pv(0.024, &[]), pv(0.055, &[1])];
        let raw = agg.decide(&values, 1.0);
        assert_eq!(raw.cutoff, 0.024);
        assert!(raw.supportable);
        assert!(!agg.decide(&values, 0.4).supportable);
    }

    #[test]
    fn test_list_deduplicates_identical_observations() {
        let mut list = PValueList::new();
        assert!(list.push(0.3, smallvec![NodeId(1)]));
        assert!(!list.push(0.3, smallvec![NodeId(1)]));
        assert!(list.push(0.3, smallvec![NodeId(2)]));
        assert!(list.push(0.2, smallvec![NodeId(1)]));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_partition_and_max_p() {
        let mut list = PValueList::new();
        list.push(0.1, smallvec![]);
        list.push(0.7, smallvec![NodeId(5)]);
        list.push(0.3, smallvec![NodeId(4), NodeId(5)]);
        let (with_b, without_b) = list.partition_by(NodeId(5));
        assert_eq!(with_b.len(), 2);
        assert_eq!(without_b.len(), 1);
        assert_eq!(list.max_p_sepset_contains(NodeId(5)), Some(true));
        assert_eq!(PValueList::new().max_p_sepset_contains(NodeId(5)), None);
    }

    proptest! {
        #[test]
        fn decision_ignores_input_order(ps in proptest::collection::vec(0f64..=1.0, 1..20), factor in 0.1f64..2.0) {
            let values: Vec<PValue> = ps.iter().enumerate().map(|(i, &p)| pv(p, &[i as u32])).collect();
            let mut reversed = values.clone();
            reversed.reverse();
            let agg = SepsetAggregator::new(0.05);
            prop_assert_eq!(agg.decide(&values, factor), agg.decide(&reversed, factor));
        }
    }
}
