//! Defines the core data structures for the search graph.
pub mod edge;
pub mod pair;
pub mod pattern;
pub mod storage;

pub use edge::{EdgeKind, EdgeMarks, Endpoint};
pub use pair::{PairKey, Triple};
pub use pattern::{EdgeSnapshot, GraphSnapshot, PatternGraph};
