//! Sepsets recorded when edges are removed.

use super::CondSet;
use crate::graph::PairKey;
use crate::store::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The conditioning set that justified removing one edge, with the p-value of the
/// deciding test. Edges removed by background knowledge carry no p-value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SepsetRecord {
    pub p_value: Option<f64>,
    pub set: CondSet,
}

impl SepsetRecord {
    pub fn tested(p_value: f64, set: CondSet) -> Self {
        Self { p_value: Some(p_value), set }
    }

    pub fn by_knowledge() -> Self {
        Self { p_value: None, set: CondSet::new() }
    }
}

/// One accepted record per pair judged independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SepsetMap {
    records: BTreeMap<PairKey, SepsetRecord>,
}

impl SepsetMap {
    pub fn new() -> Self { Self::default() }

    /// Records the sepset for `x - y`. The first record for a pair is kept.
    pub fn set(&mut self, x: NodeId, y: NodeId, record: SepsetRecord) -> bool {
        match PairKey::new(x, y) {
            Some(key) if !self.records.contains_key(&key) => {
                self.records.insert(key, record);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, x: NodeId, y: NodeId) -> Option<&SepsetRecord> {
        PairKey::new(x, y).and_then(|k| self.records.get(&k))
    }

    /// Whether `b` is in the recorded sepset of `a - c`; `None` if the pair has none.
    pub fn is_in_sepset(&self, b: NodeId, a: NodeId, c: NodeId) -> Option<bool> {
        self.get(a, c).map(|r| r.set.contains(&b))
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &SepsetRecord)> {
        self.records.iter()
    }
}
