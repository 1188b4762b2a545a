//! Datastore service and transaction contracts.

use crate::entity::Entity;
use crate::error::DatastoreResult;
use crate::key::Key;
use crate::options::TransactionOptions;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a datastore transaction.
///
/// Datastores assign it with [`TxnId::allocate`] when the transaction
/// begins. Allocated ids are unique within the process, across every
/// datastore instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxnId(pub u64);

impl TxnId {
    /// Creates a transaction ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates a fresh process-wide transaction ID.
    #[must_use]
    pub fn allocate() -> Self {
        Self(NEXT_TXN_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

/// An open datastore transaction.
///
/// # Invariants
///
/// - `id` is stable for the lifetime of the transaction
/// - after a successful `commit` or `rollback` the transaction is finished
///   and further calls fail with [`DatastoreError::InvalidArgument`]
/// - a failed `commit` leaves nothing applied
///
/// [`DatastoreError::InvalidArgument`]: crate::DatastoreError::InvalidArgument
pub trait Transaction: Send {
    /// Returns the datastore-assigned identifier.
    fn id(&self) -> TxnId;

    /// Returns true until the transaction commits or rolls back.
    fn is_active(&self) -> bool;

    /// Reads an entity inside the transaction.
    ///
    /// # Errors
    ///
    /// Fails if the transaction is finished or the read is rejected.
    fn get(&mut self, key: &Key) -> DatastoreResult<Option<Entity>>;

    /// Buffers a write of `entity` to be applied at commit.
    ///
    /// # Errors
    ///
    /// Fails if the entity has no key, the transaction is finished, or the
    /// write is rejected.
    fn put(&mut self, entity: &Entity) -> DatastoreResult<()>;

    /// Buffers a deletion to be applied at commit.
    ///
    /// # Errors
    ///
    /// Fails if the transaction is finished or the delete is rejected.
    fn delete(&mut self, key: &Key) -> DatastoreResult<()>;

    /// Applies all buffered writes atomically.
    ///
    /// # Errors
    ///
    /// Returns [`DatastoreError::ConcurrentModification`] when another
    /// transaction committed to an entity group this one touched.
    ///
    /// [`DatastoreError::ConcurrentModification`]: crate::DatastoreError::ConcurrentModification
    fn commit(&mut self) -> DatastoreResult<()>;

    /// Discards all buffered writes.
    ///
    /// # Errors
    ///
    /// Fails if the transaction is already finished.
    fn rollback(&mut self) -> DatastoreResult<()>;
}

/// Entry point to a datastore.
pub trait DatastoreService: Send + Sync {
    /// Transaction type produced by this datastore.
    type Txn: Transaction;

    /// Begins a new transaction.
    ///
    /// # Errors
    ///
    /// Fails if the datastore cannot open a transaction.
    fn begin_transaction(&self, options: &TransactionOptions) -> DatastoreResult<Self::Txn>;

    /// Reads the committed state of an entity outside any transaction.
    ///
    /// # Errors
    ///
    /// Fails if the read cannot be served.
    fn get(&self, key: &Key) -> DatastoreResult<Option<Entity>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txn_id_display() {
        assert_eq!(format!("{}", TxnId::new(42)), "txn:42");
    }

    #[test]
    fn txn_id_ordering() {
        assert!(TxnId::new(1) < TxnId::new(2));
        assert_eq!(TxnId::new(7).as_u64(), 7);
    }

    #[test]
    fn allocated_ids_increase() {
        let first = TxnId::allocate();
        let second = TxnId::allocate();
        assert!(first < second);
    }
}
