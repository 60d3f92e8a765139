// Library facade: constraint-based structure search over conditional
// independence judgments. The search starts from the complete graph, prunes it
// tier by tier, classifies unshielded triples from FDR-aggregated p-values and
// closes the orientation under the propagation rules.

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod oracle;
pub mod search;
pub mod sepset;
pub mod store;

pub use config::{AdjacencyStrategy, NeitherPolicy, SearchConfig};
pub use error::{OracleError, SearchError};
pub use graph::{PatternGraph, Triple};
pub use oracle::{DSeparationOracle, IndependenceOracle, Knowledge, KnowledgeSet, NoKnowledge, TestResult};
pub use search::{CancellationToken, CpcSearch, SearchOutcome, TripleVerdict};
pub use store::{NodeId, Variable, VariableKind, VariableRegistry};
