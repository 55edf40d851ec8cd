use thiserror::Error;

use crate::matrix::error::CscError;

/// Errors raised while building or canonicalising a symmetric pattern.
///
/// These are the "InvalidInput" taxonomy for CSC malformedness: anything a
/// caller could trigger by handing in a bad `(ptrIn, rowsIn)` pair.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("column pointers must have length n+1 = {expected}, got {actual}")]
    InvalidPointerLength { expected: usize, actual: usize },

    #[error("column pointers must be monotone non-decreasing (ptr[{index}]={prev} > ptr[{index}..]={next})")]
    PointersNotMonotone {
        index: usize,
        prev: usize,
        next: usize,
    },

    #[error("row index {row} at entry {entry} is out of bounds for n={n}")]
    RowOutOfBounds { entry: usize, row: usize, n: usize },

    #[error(transparent)]
    Csc(#[from] CscError),
}

/// Errors raised by the symbolic analysis pipeline itself.
#[derive(Debug, Error)]
pub enum AnalyseError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] PatternError),

    #[error("user-supplied order is not a valid permutation of 0..{n} (position {position} has value {value})")]
    InvalidPermutation {
        n: usize,
        position: usize,
        value: i64,
    },

    #[error("ordering collaborator failed: {reason}")]
    OrderingFailed { reason: String },

    #[error("internal invariant violated in stage '{stage}': {detail}")]
    InternalInvariant {
        stage: &'static str,
        detail: String,
    },

    #[error("workspace already consumed by a previous Symbolic::package call")]
    ConsumedWorkspace,
}

pub type AnalyseResult<T> = Result<T, AnalyseError>;

impl AnalyseError {
    pub(crate) fn invariant(stage: &'static str, detail: impl Into<String>) -> Self {
        Self::InternalInvariant {
            stage,
            detail: detail.into(),
        }
    }
}
