//! In-memory datastore with optimistic concurrency.

use crate::entity::Entity;
use crate::error::{DatastoreError, DatastoreResult};
use crate::key::Key;
use crate::options::TransactionOptions;
use crate::service::{DatastoreService, Transaction, TxnId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Maximum number of entity groups a cross-group transaction may touch.
pub const MAX_XG_GROUPS: usize = 25;

/// Committed state shared by every handle to the same datastore.
#[derive(Debug, Default)]
struct StoreState {
    /// Committed entities as CBOR bytes.
    entities: HashMap<Key, Vec<u8>>,
    /// Commit counter per entity-group root.
    group_versions: HashMap<Key, u64>,
}

impl StoreState {
    fn group_version(&self, root: &Key) -> u64 {
        self.group_versions.get(root).copied().unwrap_or(0)
    }
}

/// An in-memory datastore.
///
/// Entities are stored as CBOR so that nothing a caller holds can alias
/// committed state. Concurrency control is optimistic and per entity group:
/// a transaction remembers the version of every group it touches, and its
/// commit fails with [`DatastoreError::ConcurrentModification`] if any of
/// those groups was committed to in the meantime.
///
/// # Thread Safety
///
/// Cloning is cheap and every clone shares the same committed state.
///
/// # Example
///
/// ```rust
/// use kvorm_datastore::{DatastoreService, Entity, InMemoryDatastore, Key, Transaction,
///     TransactionOptions};
///
/// let datastore = InMemoryDatastore::new();
/// let key = Key::with_id("Foo", 1);
///
/// let mut first = datastore.begin_transaction(&TransactionOptions::new()).unwrap();
/// let mut second = datastore.begin_transaction(&TransactionOptions::new()).unwrap();
/// first.put(&Entity::with_key(key.clone())).unwrap();
/// second.put(&Entity::with_key(key)).unwrap();
///
/// first.commit().unwrap();
/// assert!(second.commit().unwrap_err().is_conflict());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatastore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryDatastore {
    /// Creates an empty datastore.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entities.len()
    }

    /// Returns true if no entities are committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many commits have written to the entity group of `key`.
    #[must_use]
    pub fn group_version(&self, key: &Key) -> u64 {
        self.state.read().group_version(key.root())
    }
}

impl DatastoreService for InMemoryDatastore {
    type Txn = InMemoryTransaction;

    fn begin_transaction(&self, options: &TransactionOptions) -> DatastoreResult<Self::Txn> {
        let id = TxnId::allocate();
        debug!(txn = %id, xg = options.xg, "datastore transaction begun");
        Ok(InMemoryTransaction {
            id,
            options: *options,
            state: Arc::clone(&self.state),
            status: TxnStatus::Active,
            observed: HashMap::new(),
            writes: HashMap::new(),
        })
    }

    fn get(&self, key: &Key) -> DatastoreResult<Option<Entity>> {
        self.state
            .read()
            .entities
            .get(key)
            .map(|bytes| decode(bytes))
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxnStatus {
    Active,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone)]
enum PendingWrite {
    Put { payload: Vec<u8> },
    Delete,
}

/// A transaction against an [`InMemoryDatastore`].
///
/// Reads see committed state only; buffered writes become visible at commit.
/// A commit that fails on a conflict leaves the transaction active so it can
/// still be rolled back.
#[derive(Debug)]
pub struct InMemoryTransaction {
    id: TxnId,
    options: TransactionOptions,
    state: Arc<RwLock<StoreState>>,
    status: TxnStatus,
    /// Entity-group root -> version observed on first touch.
    observed: HashMap<Key, u64>,
    writes: HashMap<Key, PendingWrite>,
}

impl InMemoryTransaction {
    /// Returns the options this transaction was begun with.
    #[must_use]
    pub fn options(&self) -> TransactionOptions {
        self.options
    }

    /// Returns the number of buffered writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    fn ensure_active(&self) -> DatastoreResult<()> {
        match self.status {
            TxnStatus::Active => Ok(()),
            TxnStatus::Committed => Err(DatastoreError::invalid_argument(format!(
                "transaction {} has already been committed",
                self.id
            ))),
            TxnStatus::RolledBack => Err(DatastoreError::invalid_argument(format!(
                "transaction {} has already been rolled back",
                self.id
            ))),
        }
    }

    /// Enrolls the entity group of `key`, enforcing the group limit.
    fn touch_group(&mut self, key: &Key) -> DatastoreResult<()> {
        let root = key.root();
        if self.observed.contains_key(root) {
            return Ok(());
        }

        let limit = if self.options.xg { MAX_XG_GROUPS } else { 1 };
        if self.observed.len() >= limit {
            let message = if self.options.xg {
                format!("operating on too many entity groups in a single transaction (max {MAX_XG_GROUPS})")
            } else {
                format!("cannot operate on entity group {root}: cross-group transactions are not enabled")
            };
            return Err(DatastoreError::invalid_argument(message));
        }

        let version = self.state.read().group_version(root);
        self.observed.insert(root.clone(), version);
        Ok(())
    }
}

impl Transaction for InMemoryTransaction {
    fn id(&self) -> TxnId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.status == TxnStatus::Active
    }

    fn get(&mut self, key: &Key) -> DatastoreResult<Option<Entity>> {
        self.ensure_active()?;
        self.touch_group(key)?;
        self.state
            .read()
            .entities
            .get(key)
            .map(|bytes| decode(bytes))
            .transpose()
    }

    fn put(&mut self, entity: &Entity) -> DatastoreResult<()> {
        self.ensure_active()?;
        let key = entity.key().cloned().ok_or_else(|| {
            DatastoreError::invalid_argument(format!(
                "entity of kind {} has an incomplete key",
                entity.kind()
            ))
        })?;
        self.touch_group(&key)?;
        let payload = encode(entity)?;
        self.writes.insert(key, PendingWrite::Put { payload });
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> DatastoreResult<()> {
        self.ensure_active()?;
        self.touch_group(key)?;
        self.writes.insert(key.clone(), PendingWrite::Delete);
        Ok(())
    }

    fn commit(&mut self) -> DatastoreResult<()> {
        self.ensure_active()?;

        let mut state = self.state.write();
        for (root, seen) in &self.observed {
            let current = state.group_version(root);
            if current != *seen {
                debug!(txn = %self.id, group = %root, seen, current, "commit conflict");
                return Err(DatastoreError::concurrent_modification(format!(
                    "entity group {root} was modified by another transaction"
                )));
            }
        }

        let mut written = HashSet::new();
        for (key, write) in self.writes.drain() {
            written.insert(key.root().clone());
            match write {
                PendingWrite::Put { payload } => {
                    state.entities.insert(key, payload);
                }
                PendingWrite::Delete => {
                    state.entities.remove(&key);
                }
            }
        }
        for root in written {
            *state.group_versions.entry(root).or_insert(0) += 1;
        }

        self.status = TxnStatus::Committed;
        Ok(())
    }

    fn rollback(&mut self) -> DatastoreResult<()> {
        self.ensure_active()?;
        self.writes.clear();
        self.status = TxnStatus::RolledBack;
        Ok(())
    }
}

fn encode(entity: &Entity) -> DatastoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(entity, &mut buf)
        .map_err(|e| DatastoreError::failure(format!("failed to encode entity: {e}")))?;
    Ok(buf)
}

fn decode(bytes: &[u8]) -> DatastoreResult<Entity> {
    ciborium::de::from_reader(bytes)
        .map_err(|e| DatastoreError::failure(format!("failed to decode entity: {e}")))
}
