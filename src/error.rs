use thiserror::Error;

use crate::search::AlgorithmKind;

/// Errors surfaced to callers of the engine
///
/// All of them are caller input problems: retrying the same call will fail
/// the same way.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("index {0} already exists")]
    DuplicateIndex(String),

    #[error("index {0} not found")]
    IndexNotFound(String),

    #[error("term {term} not found in index {index}")]
    TermNotFound { index: String, term: String },

    #[error("ranking algorithm {0} is not implemented")]
    UnimplementedAlgorithm(AlgorithmKind),

    #[error("unknown {what}: {value}")]
    UnknownKind { what: &'static str, value: String },
}

impl EngineError {
    /// Unknown index and unknown term form a single not-found signal
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::IndexNotFound(_) | EngineError::TermNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
