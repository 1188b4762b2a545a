//! The persistence layer's view of a datastore transaction.

use crate::error::{TxnError, TxnResult};
use kvorm_datastore::{Entity, Key, Transaction, TxnId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::warn;

/// A datastore transaction plus a cache of the writes issued inside it.
///
/// The persistence runtime flushes writes to the underlying transaction
/// itself, then records them here so later lookups in the same transaction
/// can see them without going back to the datastore (which only serves
/// committed state).
///
/// # Put/delete overlap
///
/// A key may sit in both [`put_entities`](Self::put_entities) and
/// [`deleted_keys`](Self::deleted_keys) when the runtime deletes and
/// re-writes it. The cache does not resolve that; the runtime orders its
/// own flushes.
///
/// # Equality
///
/// Two caches are equal when they wrap the same datastore transaction,
/// whatever they have recorded.
pub struct TransactionCache<T: Transaction> {
    txn: T,
    put_entities: HashMap<Key, Entity>,
    deleted_keys: HashSet<Key>,
}

impl<T: Transaction> TransactionCache<T> {
    /// Wraps a freshly begun datastore transaction.
    pub fn new(txn: T) -> Self {
        Self {
            txn,
            put_entities: HashMap::new(),
            deleted_keys: HashSet::new(),
        }
    }

    /// Returns the wrapped transaction's identifier.
    #[must_use]
    pub fn id(&self) -> TxnId {
        self.txn.id()
    }

    /// Returns the wrapped datastore transaction.
    #[must_use]
    pub fn inner(&self) -> &T {
        &self.txn
    }

    /// Returns the wrapped datastore transaction for flushing writes.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.txn
    }

    /// Records entities written in this transaction.
    ///
    /// Each entity is copied (kind and properties, not key) under its key,
    /// replacing any earlier copy. Changing the caller's entity afterwards
    /// does not affect the cache.
    ///
    /// # Errors
    ///
    /// Returns [`TxnError::IncompleteKey`] if any entity has no key; nothing
    /// from the call is recorded in that case.
    pub fn record_puts(&mut self, entities: &[Entity]) -> TxnResult<()> {
        if let Some(incomplete) = entities.iter().find(|e| e.key().is_none()) {
            return Err(TxnError::IncompleteKey {
                kind: incomplete.kind().to_string(),
            });
        }
        for entity in entities {
            if let Some(key) = entity.key() {
                self.put_entities.insert(key.clone(), entity.snapshot());
            }
        }
        Ok(())
    }

    /// Records a single written entity. See [`record_puts`](Self::record_puts).
    ///
    /// # Errors
    ///
    /// Returns [`TxnError::IncompleteKey`] if the entity has no key.
    pub fn record_put(&mut self, entity: &Entity) -> TxnResult<()> {
        self.record_puts(std::slice::from_ref(entity))
    }

    /// Records a key deleted in this transaction. Idempotent.
    pub fn record_delete(&mut self, key: Key) {
        self.deleted_keys.insert(key);
    }

    /// Entities written in this transaction, by key.
    #[must_use]
    pub fn put_entities(&self) -> &HashMap<Key, Entity> {
        &self.put_entities
    }

    /// Keys deleted in this transaction.
    #[must_use]
    pub fn deleted_keys(&self) -> &HashSet<Key> {
        &self.deleted_keys
    }

    /// Returns the last state written for `key` in this transaction.
    #[must_use]
    pub fn cached_entity(&self, key: &Key) -> Option<&Entity> {
        self.put_entities.get(key)
    }

    /// Returns true if `key` was deleted in this transaction.
    #[must_use]
    pub fn is_deleted(&self, key: &Key) -> bool {
        self.deleted_keys.contains(key)
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.put_entities.is_empty() && self.deleted_keys.is_empty()
    }

    /// Commits the datastore transaction, then clears the cache.
    ///
    /// # Errors
    ///
    /// Translates the datastore's failure (see [`TxnError::from_datastore`]).
    /// The cache keeps its contents when commit fails.
    pub fn commit(&mut self) -> TxnResult<()> {
        if let Err(e) = self.txn.commit() {
            warn!(txn = %self.id(), error = %e, "datastore commit failed");
            return Err(TxnError::from_datastore(e));
        }
        self.clear();
        Ok(())
    }

    /// Rolls back the datastore transaction, then clears the cache.
    ///
    /// # Errors
    ///
    /// Translates the datastore's failure. The cache keeps its contents when
    /// rollback fails.
    pub fn rollback(&mut self) -> TxnResult<()> {
        if let Err(e) = self.txn.rollback() {
            warn!(txn = %self.id(), error = %e, "datastore rollback failed");
            return Err(TxnError::from_datastore(e));
        }
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.put_entities.clear();
        self.deleted_keys.clear();
    }
}

impl<T: Transaction> PartialEq for TransactionCache<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<T: Transaction> Eq for TransactionCache<T> {}

impl<T: Transaction> Hash for TransactionCache<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<T: Transaction> fmt::Debug for TransactionCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionCache")
            .field("txn", &self.id())
            .field("put_entities", &self.put_entities.len())
            .field("deleted_keys", &self.deleted_keys.len())
            .finish()
    }
}
