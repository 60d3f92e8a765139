use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable index of a variable in the registry. Every graph and sepset structure
/// refers to variables through this key, never through the `Variable` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    Continuous,
    Discrete,
}

/// A measured variable of the dataset. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: VariableKind::Continuous }
    }

    pub fn discrete(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: VariableKind::Discrete }
    }
}
