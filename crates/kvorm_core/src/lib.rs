//! # kvorm Core
//!
//! Transaction coordination between an object-relational persistence
//! runtime and a key-value datastore.
//!
//! This crate provides:
//! - [`TransactionCache`]: a datastore transaction plus the writes issued
//!   inside it, for read-your-writes lookups
//! - [`DatastoreXaResource`]: a single-shard datastore transaction exposed
//!   through the XA resource contract
//! - [`TxnError`]: the error vocabulary datastore failures are translated into
//! - [`AdapterConfig`]: transaction options and resource selection
//!
//! ## Example
//!
//! ```rust
//! use kvorm_core::{DatastoreXaResource, XaFlags, XaResource, Xid};
//! use kvorm_datastore::{Entity, InMemoryDatastore, Key, Transaction, TransactionOptions};
//!
//! let mut resource = DatastoreXaResource::new(InMemoryDatastore::new(), TransactionOptions::new());
//! let xid = Xid::generate();
//!
//! resource.start(&xid, XaFlags::NO_FLAGS).unwrap();
//! let txn = resource.current_transaction_mut().unwrap();
//! let entity = Entity::with_key(Key::with_id("Foo", 1));
//! txn.inner_mut().put(&entity).unwrap();
//! txn.record_put(&entity).unwrap();
//!
//! resource.commit(&xid, true).unwrap();
//! assert!(resource.current_transaction().is_none());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
mod error;
pub mod transaction;
pub mod xa;

pub use config::AdapterConfig;
pub use error::{TxnError, TxnResult};
pub use transaction::TransactionCache;
pub use xa::{
    resource_for, DatastoreXaResource, EmulatedXaResource, PrepareVote, XaFlags, XaResource, Xid,
};
