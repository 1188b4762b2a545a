//! XA resource for connections that do not run datastore transactions.

use crate::error::TxnResult;
use crate::transaction::TransactionCache;
use crate::xa::resource::XaResource;
use crate::xa::xid::{PrepareVote, XaFlags, Xid};
use kvorm_datastore::Transaction;
use std::fmt;
use std::marker::PhantomData;
use tracing::trace;

/// Follows the XA lifecycle without touching the datastore.
///
/// Used when the runtime manages a connection without auto-created
/// transactions: every call succeeds and is logged, `prepare` votes
/// read-only, and there is never a current transaction.
pub struct EmulatedXaResource<T> {
    _txn: PhantomData<fn() -> T>,
}

impl<T> EmulatedXaResource<T> {
    /// Creates a new emulated resource.
    #[must_use]
    pub fn new() -> Self {
        Self { _txn: PhantomData }
    }
}

impl<T> Default for EmulatedXaResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EmulatedXaResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmulatedXaResource")
    }
}

impl<T: Transaction> XaResource for EmulatedXaResource<T> {
    type Txn = T;

    fn start(&mut self, xid: &Xid, flags: XaFlags) -> TxnResult<()> {
        trace!(%xid, flags = flags.0, "emulated start");
        Ok(())
    }

    fn end(&mut self, xid: &Xid, flags: XaFlags) -> TxnResult<()> {
        trace!(%xid, flags = flags.0, "emulated end");
        Ok(())
    }

    fn prepare(&mut self, xid: &Xid) -> TxnResult<PrepareVote> {
        trace!(%xid, "emulated prepare");
        Ok(PrepareVote::ReadOnly)
    }

    fn commit(&mut self, xid: &Xid, one_phase: bool) -> TxnResult<()> {
        trace!(%xid, one_phase, "emulated commit");
        Ok(())
    }

    fn rollback(&mut self, xid: &Xid) -> TxnResult<()> {
        trace!(%xid, "emulated rollback");
        Ok(())
    }

    fn current_transaction(&self) -> Option<&TransactionCache<T>> {
        None
    }

    fn current_transaction_mut(&mut self) -> Option<&mut TransactionCache<T>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvorm_datastore::InMemoryTransaction;

    #[test]
    fn lifecycle_always_succeeds() {
        let mut resource = EmulatedXaResource::<InMemoryTransaction>::new();
        let xid = Xid::generate();

        resource.start(&xid, XaFlags::NO_FLAGS).unwrap();
        resource.start(&xid, XaFlags::JOIN).unwrap();
        resource.end(&xid, XaFlags::SUCCESS).unwrap();
        assert_eq!(resource.prepare(&xid).unwrap(), PrepareVote::ReadOnly);
        resource.commit(&xid, false).unwrap();
        resource.rollback(&xid).unwrap();
    }

    #[test]
    fn never_has_a_current_transaction() {
        let mut resource = EmulatedXaResource::<InMemoryTransaction>::default();
        resource.start(&Xid::generate(), XaFlags::NO_FLAGS).unwrap();
        assert!(resource.current_transaction().is_none());
        assert!(resource.current_transaction_mut().is_none());
    }
}
