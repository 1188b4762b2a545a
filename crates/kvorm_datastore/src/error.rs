//! Native datastore errors.

use thiserror::Error;

/// Result type for datastore operations.
pub type DatastoreResult<T> = Result<T, DatastoreError>;

/// Failures a datastore can report.
///
/// These are the datastore's own error kinds. The transaction layer never
/// lets them escape unwrapped; see `kvorm_core::TxnError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatastoreError {
    /// The request was malformed or not allowed in the current state.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the request.
        message: String,
    },

    /// Another transaction committed conflicting writes first.
    #[error("concurrent modification: {message}")]
    ConcurrentModification {
        /// Description of the conflict.
        message: String,
    },

    /// Any other datastore-side failure.
    #[error("datastore failure: {message}")]
    Failure {
        /// Description of the failure.
        message: String,
    },
}

impl DatastoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a concurrent modification error.
    pub fn concurrent_modification(message: impl Into<String>) -> Self {
        Self::ConcurrentModification {
            message: message.into(),
        }
    }

    /// Creates a generic failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Returns true if this is an optimistic-concurrency conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}
