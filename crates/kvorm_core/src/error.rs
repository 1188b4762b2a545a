//! Error types for the transaction layer.

use kvorm_datastore::DatastoreError;
use thiserror::Error;

/// Result type for transaction operations.
pub type TxnResult<T> = Result<T, TxnError>;

/// Errors raised by the transaction cache and the XA resources.
///
/// Datastore failures are never surfaced as [`DatastoreError`] directly;
/// they are translated into one of the `InvalidArgument`,
/// `ConcurrentModification` or `DatastoreFailure` variants, which keep the
/// native error as their [`source`](std::error::Error::source).
#[derive(Debug, Error)]
pub enum TxnError {
    /// `start` was called while a transaction is active.
    #[error("transaction already started")]
    AlreadyStarted,

    /// `commit` was called with no active transaction.
    #[error("commit invalid: no transaction is active")]
    CommitInvalid,

    /// `rollback` was called with no active transaction.
    #[error("rollback invalid: no transaction is active")]
    RollbackInvalid,

    /// An entity without a key was handed to the cache.
    #[error("cannot cache entity of kind {kind}: key is incomplete")]
    IncompleteKey {
        /// Kind of the rejected entity.
        kind: String,
    },

    /// The datastore rejected the request.
    #[error("illegal argument")]
    InvalidArgument {
        /// The datastore's error.
        #[source]
        source: DatastoreError,
    },

    /// Another transaction committed conflicting writes first.
    #[error("concurrent modification")]
    ConcurrentModification {
        /// The datastore's conflict report.
        #[source]
        source: DatastoreError,
    },

    /// Any other datastore failure.
    #[error("datastore failure")]
    DatastoreFailure {
        /// The datastore's error.
        #[source]
        source: DatastoreError,
    },

    /// A configuration property holds an unusable value.
    #[error("invalid value {value:?} for configuration property {key}")]
    InvalidConfig {
        /// Property name.
        key: String,
        /// Rejected value.
        value: String,
    },
}

impl TxnError {
    /// Translates a native datastore error into the transaction vocabulary.
    pub fn from_datastore(source: DatastoreError) -> Self {
        match source {
            DatastoreError::InvalidArgument { .. } => Self::InvalidArgument { source },
            DatastoreError::ConcurrentModification { .. } => {
                Self::ConcurrentModification { source }
            }
            DatastoreError::Failure { .. } => Self::DatastoreFailure { source },
        }
    }

    /// Creates an invalid config error.
    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns true if this error reports a lifecycle misuse
    /// (start while active, commit or rollback while idle).
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyStarted | Self::CommitInvalid | Self::RollbackInvalid
        )
    }

    /// Returns true if this error is an optimistic-concurrency conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }

    /// Returns the underlying datastore error, if this error wraps one.
    #[must_use]
    pub fn datastore_cause(&self) -> Option<&DatastoreError> {
        match self {
            Self::InvalidArgument { source }
            | Self::ConcurrentModification { source }
            | Self::DatastoreFailure { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn translation_picks_matching_kind() {
        let err = TxnError::from_datastore(DatastoreError::invalid_argument("bad key"));
        assert!(matches!(err, TxnError::InvalidArgument { .. }));

        let err = TxnError::from_datastore(DatastoreError::concurrent_modification("group"));
        assert!(err.is_conflict());

        let err = TxnError::from_datastore(DatastoreError::failure("unavailable"));
        assert!(matches!(err, TxnError::DatastoreFailure { .. }));
        assert!(!err.is_conflict());
    }

    #[test]
    fn translated_error_keeps_cause() {
        let native = DatastoreError::concurrent_modification("entity group Foo(1)");
        let err = TxnError::from_datastore(native.clone());

        assert_eq!(err.datastore_cause(), Some(&native));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), native.to_string());
    }

    #[test]
    fn lifecycle_errors() {
        assert!(TxnError::AlreadyStarted.is_invalid_transition());
        assert!(TxnError::CommitInvalid.is_invalid_transition());
        assert!(TxnError::RollbackInvalid.is_invalid_transition());
        assert!(!TxnError::from_datastore(DatastoreError::failure("x")).is_invalid_transition());
        assert!(TxnError::CommitInvalid.datastore_cause().is_none());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            TxnError::AlreadyStarted.to_string(),
            "transaction already started"
        );
        let err = TxnError::invalid_config("some.key", "maybe");
        assert!(err.to_string().contains("some.key"));
        assert!(err.to_string().contains("maybe"));
    }
}
