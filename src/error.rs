//! Error types for tree and reconciler operations.

/// A batch or item list that breaks the preconditions of an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    /// A batch record has a smaller index than the record before it.
    #[error("batch is not sorted: index {index} at position {position} follows {previous}")]
    Unsorted {
        position: usize,
        index: usize,
        previous: usize,
    },

    /// A batch record points past the sequence it is applied to.
    #[error("index {index} at position {position} is out of range for length {len}")]
    OutOfRange {
        position: usize,
        index: usize,
        len: usize,
    },

    /// An item handed to the reconciler has no key.
    #[error("item at position {position} has no key")]
    MissingKey { position: usize },
}

/// Errors that can occur while building or reconciling trees.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The tree configuration is unusable (e.g. a balance outside `(0, 1]`).
    #[error("invalid config: {0}")]
    Config(String),

    /// A structural invariant does not hold. Only reported by [`crate::Tree::check`].
    #[error("corrupt tree: {0}")]
    Corrupt(String),
}

impl Error {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

/// Convenience alias for tree results.
pub type Result<T, E = Error> = std::result::Result<T, E>;
