//! XA resource backed by a single datastore transaction.

use crate::error::{TxnError, TxnResult};
use crate::transaction::TransactionCache;
use crate::xa::resource::XaResource;
use crate::xa::xid::{PrepareVote, XaFlags, Xid};
use kvorm_datastore::{DatastoreService, TransactionOptions};
use std::fmt;
use tracing::{debug, warn};

/// Presents one non-distributed datastore transaction as an XA resource.
///
/// ## States
///
/// - **Idle**: no transaction. `start` begins one; `commit` and `rollback`
///   fail with [`TxnError::CommitInvalid`] / [`TxnError::RollbackInvalid`].
/// - **Active**: a [`TransactionCache`] is open. `start` fails with
///   [`TxnError::AlreadyStarted`]; a successful `commit` or `rollback`
///   returns to Idle.
///
/// A failed `commit` or `rollback` leaves the resource Active with the cache
/// untouched, so the caller can inspect it and roll back. Nothing is retried.
///
/// One-phase and two-phase commit are handled the same way: the datastore
/// transaction covers a single shard, so there is nothing to coordinate.
pub struct DatastoreXaResource<D: DatastoreService> {
    datastore: D,
    /// Options for every transaction this resource begins.
    txn_options: TransactionOptions,
    current: Option<TransactionCache<D::Txn>>,
}

impl<D: DatastoreService> DatastoreXaResource<D> {
    /// Creates an idle resource.
    pub fn new(datastore: D, txn_options: TransactionOptions) -> Self {
        Self {
            datastore,
            txn_options,
            current: None,
        }
    }

    /// Returns the options used for new transactions.
    #[must_use]
    pub fn txn_options(&self) -> TransactionOptions {
        self.txn_options
    }

    /// Returns the datastore this resource begins transactions on.
    #[must_use]
    pub fn datastore(&self) -> &D {
        &self.datastore
    }

    /// Returns true if a transaction is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }
}

impl<D: DatastoreService> XaResource for DatastoreXaResource<D> {
    type Txn = D::Txn;

    fn start(&mut self, xid: &Xid, flags: XaFlags) -> TxnResult<()> {
        if let Some(current) = &self.current {
            warn!(%xid, txn = %current.id(), "start requested while a transaction is active");
            return Err(TxnError::AlreadyStarted);
        }

        let txn = self
            .datastore
            .begin_transaction(&self.txn_options)
            .map_err(TxnError::from_datastore)?;
        let cache = TransactionCache::new(txn);
        debug!(%xid, txn = %cache.id(), flags = flags.0, "transaction started");
        self.current = Some(cache);
        Ok(())
    }

    fn end(&mut self, xid: &Xid, flags: XaFlags) -> TxnResult<()> {
        debug!(%xid, flags = flags.0, "transaction branch ended");
        Ok(())
    }

    fn prepare(&mut self, xid: &Xid) -> TxnResult<PrepareVote> {
        let vote = if self.current.is_some() {
            PrepareVote::Ok
        } else {
            PrepareVote::ReadOnly
        };
        debug!(%xid, ?vote, "transaction prepared");
        Ok(vote)
    }

    fn commit(&mut self, xid: &Xid, one_phase: bool) -> TxnResult<()> {
        let Some(current) = self.current.as_mut() else {
            warn!(%xid, "commit requested with no active transaction");
            return Err(TxnError::CommitInvalid);
        };

        current.commit()?;
        debug!(%xid, txn = %current.id(), one_phase, "transaction committed");
        self.current = None;
        Ok(())
    }

    fn rollback(&mut self, xid: &Xid) -> TxnResult<()> {
        let Some(current) = self.current.as_mut() else {
            warn!(%xid, "rollback requested with no active transaction");
            return Err(TxnError::RollbackInvalid);
        };

        current.rollback()?;
        debug!(%xid, txn = %current.id(), "transaction rolled back");
        self.current = None;
        Ok(())
    }

    fn current_transaction(&self) -> Option<&TransactionCache<D::Txn>> {
        self.current.as_ref()
    }

    fn current_transaction_mut(&mut self) -> Option<&mut TransactionCache<D::Txn>> {
        self.current.as_mut()
    }
}

impl<D: DatastoreService> fmt::Debug for DatastoreXaResource<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatastoreXaResource")
            .field("txn_options", &self.txn_options)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvorm_datastore::{Entity, InMemoryDatastore, Key, Transaction, Value};

    fn create_resource() -> DatastoreXaResource<InMemoryDatastore> {
        DatastoreXaResource::new(InMemoryDatastore::new(), TransactionOptions::new())
    }

    #[test]
    fn new_resource_is_idle() {
        let resource = create_resource();
        assert!(!resource.is_active());
        assert!(resource.current_transaction().is_none());
    }

    #[test]
    fn start_opens_empty_cache() {
        let mut resource = create_resource();
        resource.start(&Xid::generate(), XaFlags::NO_FLAGS).unwrap();

        let current = resource.current_transaction().unwrap();
        assert!(current.is_empty());
        assert!(current.inner().is_active());
    }

    #[test]
    fn start_twice_fails_and_keeps_cache() {
        let mut resource = create_resource();
        let xid = Xid::generate();
        resource.start(&xid, XaFlags::NO_FLAGS).unwrap();
        let id = resource.current_transaction().unwrap().id();

        let err = resource.start(&xid, XaFlags::JOIN).unwrap_err();
        assert!(matches!(err, TxnError::AlreadyStarted));
        assert_eq!(resource.current_transaction().unwrap().id(), id);
    }

    #[test]
    fn commit_while_idle_is_invalid() {
        let mut resource = create_resource();
        let err = resource.commit(&Xid::generate(), true).unwrap_err();
        assert!(matches!(err, TxnError::CommitInvalid));
        assert!(!resource.is_active());
    }

    #[test]
    fn rollback_while_idle_is_invalid() {
        let mut resource = create_resource();
        let err = resource.rollback(&Xid::generate()).unwrap_err();
        assert!(matches!(err, TxnError::RollbackInvalid));
        assert!(!resource.is_active());
    }

    #[test]
    fn commit_applies_and_returns_to_idle() {
        let mut resource = create_resource();
        let xid = Xid::generate();
        let key = Key::with_id("Foo", 1);
        let mut entity = Entity::with_key(key.clone());
        entity.set_property("a", 1);

        resource.start(&xid, XaFlags::NO_FLAGS).unwrap();
        let current = resource.current_transaction_mut().unwrap();
        current.inner_mut().put(&entity).unwrap();
        current.record_put(&entity).unwrap();

        resource.end(&xid, XaFlags::SUCCESS).unwrap();
        assert_eq!(resource.prepare(&xid).unwrap(), PrepareVote::Ok);
        resource.commit(&xid, false).unwrap();

        assert!(!resource.is_active());
        let stored = resource.datastore().get(&key).unwrap().unwrap();
        assert_eq!(stored.property("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn rollback_discards_and_returns_to_idle() {
        let mut resource = create_resource();
        let xid = Xid::generate();
        let entity = Entity::with_key(Key::with_id("Foo", 1));

        resource.start(&xid, XaFlags::NO_FLAGS).unwrap();
        let current = resource.current_transaction_mut().unwrap();
        current.inner_mut().put(&entity).unwrap();
        current.record_put(&entity).unwrap();
        resource.rollback(&xid).unwrap();

        assert!(!resource.is_active());
        assert!(resource.datastore().is_empty());
    }

    #[test]
    fn prepare_while_idle_is_read_only() {
        let mut resource = create_resource();
        assert_eq!(
            resource.prepare(&Xid::generate()).unwrap(),
            PrepareVote::ReadOnly
        );
    }

    #[test]
    fn transactions_use_configured_options() {
        let mut resource = DatastoreXaResource::new(
            InMemoryDatastore::new(),
            TransactionOptions::new().xg(true),
        );
        assert!(resource.txn_options().is_xg());
        resource.start(&Xid::generate(), XaFlags::NO_FLAGS).unwrap();

        let current = resource.current_transaction().unwrap();
        assert_eq!(current.inner().options(), resource.txn_options());
    }

    #[test]
    fn each_start_begins_a_new_transaction() {
        let mut resource = create_resource();
        let xid = Xid::generate();

        resource.start(&xid, XaFlags::NO_FLAGS).unwrap();
        let first = resource.current_transaction().unwrap().id();
        resource.commit(&xid, true).unwrap();

        resource.start(&xid, XaFlags::NO_FLAGS).unwrap();
        let second = resource.current_transaction().unwrap().id();
        assert_ne!(first, second);
    }
}
