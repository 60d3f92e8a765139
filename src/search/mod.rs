//! The search phases and the pipeline that chains them.
pub mod adjacency;
pub mod cancel;
pub mod context;
pub mod meek;
pub mod orient;
pub mod pipeline;
pub mod triples;

pub use adjacency::AdjacencyReport;
pub use cancel::CancellationToken;
pub use context::SearchContext;
pub use meek::MeekRules;
pub use orient::OrientationReport;
pub use pipeline::{CpcSearch, SearchOutcome};
pub use triples::{ClassifiedTriple, TripleReport, TripleVerdict};
