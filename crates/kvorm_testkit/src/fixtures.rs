//! Test fixtures.
//!
//! [`ScriptedDatastore`] is a datastore whose failures are chosen by the
//! test: queue an error for the next `begin`, `commit` or `rollback` and
//! that call returns it. Calls without a queued error succeed. It stores
//! nothing; use `InMemoryDatastore` when committed state matters.

use kvorm_datastore::{
    DatastoreError, DatastoreResult, DatastoreService, Entity, Key, Transaction,
    TransactionOptions, TxnId,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Script {
    begin_failures: VecDeque<DatastoreError>,
    commit_failures: VecDeque<DatastoreError>,
    rollback_failures: VecDeque<DatastoreError>,
    begins: u64,
    commits: u64,
    rollbacks: u64,
    last_options: Option<TransactionOptions>,
}

/// A datastore with scripted failures.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDatastore {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDatastore {
    /// Creates a datastore where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `begin_transaction` fail with `error`.
    pub fn fail_next_begin(&self, error: DatastoreError) {
        self.script.lock().begin_failures.push_back(error);
    }

    /// Makes the next transaction `commit` fail with `error`.
    pub fn fail_next_commit(&self, error: DatastoreError) {
        self.script.lock().commit_failures.push_back(error);
    }

    /// Makes the next transaction `rollback` fail with `error`.
    pub fn fail_next_rollback(&self, error: DatastoreError) {
        self.script.lock().rollback_failures.push_back(error);
    }

    /// Number of transactions begun.
    #[must_use]
    pub fn begin_count(&self) -> u64 {
        self.script.lock().begins
    }

    /// Number of successful commits.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.script.lock().commits
    }

    /// Number of successful rollbacks.
    #[must_use]
    pub fn rollback_count(&self) -> u64 {
        self.script.lock().rollbacks
    }

    /// Options passed to the most recent `begin_transaction`.
    #[must_use]
    pub fn last_options(&self) -> Option<TransactionOptions> {
        self.script.lock().last_options
    }

    /// Creates a transaction handle with a chosen id, outside `begin_transaction`.
    ///
    /// Two handles made with the same id stand for the same datastore
    /// transaction.
    #[must_use]
    pub fn transaction_with_id(&self, id: u64) -> ScriptedTransaction {
        self.transaction(TxnId::new(id))
    }

    fn transaction(&self, id: TxnId) -> ScriptedTransaction {
        ScriptedTransaction {
            id,
            script: Arc::clone(&self.script),
            active: true,
            writes: 0,
        }
    }
}

impl DatastoreService for ScriptedDatastore {
    type Txn = ScriptedTransaction;

    fn begin_transaction(&self, options: &TransactionOptions) -> DatastoreResult<Self::Txn> {
        {
            let mut script = self.script.lock();
            if let Some(error) = script.begin_failures.pop_front() {
                return Err(error);
            }
            script.begins += 1;
            script.last_options = Some(*options);
        }
        Ok(self.transaction(TxnId::allocate()))
    }

    fn get(&self, _key: &Key) -> DatastoreResult<Option<Entity>> {
        Ok(None)
    }
}

/// Transaction handle produced by [`ScriptedDatastore`].
///
/// A scripted commit or rollback failure leaves the handle active.
#[derive(Debug)]
pub struct ScriptedTransaction {
    id: TxnId,
    script: Arc<Mutex<Script>>,
    active: bool,
    writes: usize,
}

impl ScriptedTransaction {
    /// Number of puts and deletes issued on this handle.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn ensure_active(&self) -> DatastoreResult<()> {
        if self.active {
            Ok(())
        } else {
            Err(DatastoreError::invalid_argument(format!(
                "transaction {} is no longer active",
                self.id
            )))
        }
    }
}

impl Transaction for ScriptedTransaction {
    fn id(&self) -> TxnId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn get(&mut self, _key: &Key) -> DatastoreResult<Option<Entity>> {
        self.ensure_active()?;
        Ok(None)
    }

    fn put(&mut self, entity: &Entity) -> DatastoreResult<()> {
        self.ensure_active()?;
        if entity.key().is_none() {
            return Err(DatastoreError::invalid_argument("entity key is incomplete"));
        }
        self.writes += 1;
        Ok(())
    }

    fn delete(&mut self, _key: &Key) -> DatastoreResult<()> {
        self.ensure_active()?;
        self.writes += 1;
        Ok(())
    }

    fn commit(&mut self) -> DatastoreResult<()> {
        self.ensure_active()?;
        let mut script = self.script.lock();
        if let Some(error) = script.commit_failures.pop_front() {
            return Err(error);
        }
        script.commits += 1;
        self.active = false;
        Ok(())
    }

    fn rollback(&mut self) -> DatastoreResult<()> {
        self.ensure_active()?;
        let mut script = self.script.lock();
        if let Some(error) = script.rollback_failures.pop_front() {
            return Err(error);
        }
        script.rollbacks += 1;
        self.active = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_succeed_by_default() {
        let ds = ScriptedDatastore::new();
        let mut txn = ds.begin_transaction(&TransactionOptions::new()).unwrap();
        txn.put(&Entity::with_key(Key::with_id("Foo", 1))).unwrap();
        txn.commit().unwrap();

        assert!(!txn.is_active());
        assert_eq!(ds.begin_count(), 1);
        assert_eq!(ds.commit_count(), 1);
    }

    #[test]
    fn queued_commit_failure_is_returned_once() {
        let ds = ScriptedDatastore::new();
        ds.fail_next_commit(DatastoreError::concurrent_modification("scripted"));

        let mut txn = ds.begin_transaction(&TransactionOptions::new()).unwrap();
        assert!(txn.commit().unwrap_err().is_conflict());
        assert!(txn.is_active());
        txn.commit().unwrap();
        assert_eq!(ds.commit_count(), 1);
    }

    #[test]
    fn queued_begin_failure() {
        let ds = ScriptedDatastore::new();
        ds.fail_next_begin(DatastoreError::failure("unavailable"));

        assert!(ds.begin_transaction(&TransactionOptions::new()).is_err());
        assert!(ds.begin_transaction(&TransactionOptions::new()).is_ok());
        assert_eq!(ds.begin_count(), 1);
    }

    #[test]
    fn records_begin_options() {
        let ds = ScriptedDatastore::new();
        ds.begin_transaction(&TransactionOptions::new().xg(true))
            .unwrap();
        assert_eq!(ds.last_options(), Some(TransactionOptions::new().xg(true)));
    }

    #[test]
    fn handles_with_same_id_share_identity() {
        let ds = ScriptedDatastore::new();
        let a = ds.transaction_with_id(7);
        let b = ds.transaction_with_id(7);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn begun_ids_differ_across_datastores() {
        let opts = TransactionOptions::new();
        let a = ScriptedDatastore::new().begin_transaction(&opts).unwrap();
        let b = ScriptedDatastore::new().begin_transaction(&opts).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn writes_are_counted() {
        let ds = ScriptedDatastore::new();
        let mut txn = ds.begin_transaction(&TransactionOptions::new()).unwrap();
        txn.put(&Entity::with_key(Key::with_id("Foo", 1))).unwrap();
        txn.delete(&Key::with_id("Foo", 2)).unwrap();
        assert_eq!(txn.write_count(), 2);
    }
}
