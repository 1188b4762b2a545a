//! The resource-manager contract.

use crate::config::AdapterConfig;
use crate::error::TxnResult;
use crate::transaction::TransactionCache;
use crate::xa::datastore::DatastoreXaResource;
use crate::xa::emulated::EmulatedXaResource;
use crate::xa::xid::{PrepareVote, XaFlags, Xid};
use kvorm_datastore::{DatastoreService, Transaction};

/// A resource that a generic transaction manager drives through the XA
/// lifecycle: `start`, `end`, `prepare`, then `commit` or `rollback`.
///
/// Resources here manage at most one branch at a time. Every method takes
/// `&mut self`, so one resource is driven by one thread.
pub trait XaResource {
    /// Datastore transaction type behind [`current_transaction`](Self::current_transaction).
    type Txn: Transaction;

    /// Associates the resource with `xid` and begins work.
    ///
    /// # Errors
    ///
    /// [`TxnError::AlreadyStarted`](crate::TxnError::AlreadyStarted) if a
    /// transaction is already active, or a translated datastore error.
    fn start(&mut self, xid: &Xid, flags: XaFlags) -> TxnResult<()>;

    /// Ends the association with `xid`.
    ///
    /// # Errors
    ///
    /// Implementations may reject an `end` they cannot honor.
    fn end(&mut self, xid: &Xid, flags: XaFlags) -> TxnResult<()>;

    /// Votes on whether `xid` can commit.
    ///
    /// # Errors
    ///
    /// Implementations may fail if they cannot vote.
    fn prepare(&mut self, xid: &Xid) -> TxnResult<PrepareVote>;

    /// Commits the work done for `xid`.
    ///
    /// # Errors
    ///
    /// [`TxnError::CommitInvalid`](crate::TxnError::CommitInvalid) if no
    /// transaction is active, or a translated datastore error.
    fn commit(&mut self, xid: &Xid, one_phase: bool) -> TxnResult<()>;

    /// Rolls back the work done for `xid`.
    ///
    /// # Errors
    ///
    /// [`TxnError::RollbackInvalid`](crate::TxnError::RollbackInvalid) if
    /// no transaction is active, or a translated datastore error.
    fn rollback(&mut self, xid: &Xid) -> TxnResult<()>;

    /// Discards knowledge of a heuristically completed branch.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn forget(&mut self, _xid: &Xid) -> TxnResult<()> {
        Ok(())
    }

    /// Lists prepared branches awaiting resolution.
    ///
    /// A single-shard transaction is never left in doubt, so the default
    /// implementation reports none.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn recover(&self, _flags: XaFlags) -> TxnResult<Vec<Xid>> {
        Ok(Vec::new())
    }

    /// Returns the active transaction cache, if any.
    fn current_transaction(&self) -> Option<&TransactionCache<Self::Txn>>;

    /// Returns the active transaction cache for recording writes, if any.
    fn current_transaction_mut(&mut self) -> Option<&mut TransactionCache<Self::Txn>>;
}

/// Builds the resource a connection should enlist.
///
/// With `auto_create_transaction` the resource begins a datastore
/// transaction on `start`; otherwise it only follows the XA lifecycle.
pub fn resource_for<D>(
    datastore: D,
    config: &AdapterConfig,
) -> Box<dyn XaResource<Txn = D::Txn>>
where
    D: DatastoreService + 'static,
    D::Txn: 'static,
{
    if config.auto_create_transaction {
        Box::new(DatastoreXaResource::new(datastore, config.txn_options))
    } else {
        Box::new(EmulatedXaResource::<D::Txn>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvorm_datastore::InMemoryDatastore;

    #[test]
    fn auto_create_gives_datastore_resource() {
        let mut resource = resource_for(InMemoryDatastore::new(), &AdapterConfig::new());
        let xid = Xid::generate();

        resource.start(&xid, XaFlags::NO_FLAGS).unwrap();
        assert!(resource.current_transaction().is_some());
        resource.commit(&xid, true).unwrap();
        assert!(resource.current_transaction().is_none());
    }

    #[test]
    fn without_auto_create_gives_emulated_resource() {
        let config = AdapterConfig::new().auto_create_transaction(false);
        let mut resource = resource_for(InMemoryDatastore::new(), &config);
        let xid = Xid::generate();

        resource.start(&xid, XaFlags::NO_FLAGS).unwrap();
        assert!(resource.current_transaction().is_none());
        assert_eq!(resource.prepare(&xid).unwrap(), PrepareVote::ReadOnly);
        resource.commit(&xid, false).unwrap();
    }

    #[test]
    fn recover_reports_nothing() {
        let resource = resource_for(InMemoryDatastore::new(), &AdapterConfig::new());
        assert!(resource.recover(XaFlags::START_RSCAN).unwrap().is_empty());
    }
}
