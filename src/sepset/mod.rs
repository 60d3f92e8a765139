//! Conditioning sets, p-value bookkeeping and the sepsets that justify removals.
pub mod aggregator;
pub mod enumerator;
pub mod fdr;
pub mod map;

pub use aggregator::{Decision, PValue, PValueList, SepsetAggregator};
pub use enumerator::{Combinations, ConditioningSetEnumerator};
pub use map::{SepsetMap, SepsetRecord};

use crate::store::NodeId;
use smallvec::SmallVec;

/// A conditioning set, ascending by id. Inline for the small depths searches use.
pub type CondSet = SmallVec<[NodeId; 8]>;
