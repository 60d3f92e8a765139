//! Error types for the structure search.

use crate::store::NodeId;
use thiserror::Error;

/// Failure reported by an independence oracle.
///
/// `Degenerate` is local to one test (singular covariance, empty cell counts, ...):
/// the search gives up on that pair and keeps going. `Unavailable` means the oracle
/// cannot answer anything at all and the search stops.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("degenerate test of {x} and {y}: {reason}")]
    Degenerate { x: NodeId, y: NodeId, reason: String },
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

impl OracleError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, OracleError::Unavailable(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("inconsistent knowledge: required edge {from} --> {to} conflicts with another constraint")]
    InconsistentKnowledge { from: String, to: String },
    #[error("duplicate variable name '{0}'")]
    DuplicateVariable(String),
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("independence oracle failed: {0}")]
    Oracle(#[from] OracleError),
}
