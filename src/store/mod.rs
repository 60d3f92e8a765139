//! Variable identities and the registry that owns them.
pub mod registry;
pub mod types;

pub use registry::VariableRegistry;
pub use types::{NodeId, Variable, VariableKind};
