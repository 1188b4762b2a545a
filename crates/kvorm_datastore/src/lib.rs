//! # kvorm Datastore
//!
//! Datastore contracts consumed by the kvorm transaction layer.
//!
//! This crate defines the vocabulary shared between the persistence layer
//! and a cloud key-value datastore:
//! - [`Key`] and [`Entity`] - the record model
//! - [`Value`] - dynamically typed property values
//! - [`TransactionOptions`] - per-transaction settings (cross-group mode)
//! - [`DatastoreService`] and [`Transaction`] - the service contract
//! - [`DatastoreError`] - the three native failure kinds
//!
//! It also ships [`InMemoryDatastore`], a versioned, optimistic-concurrency
//! implementation for tests and embedded use.
//!
//! ## Example
//!
//! ```rust
//! use kvorm_datastore::{
//!     DatastoreService, Entity, InMemoryDatastore, Key, Transaction, TransactionOptions,
//! };
//!
//! let datastore = InMemoryDatastore::new();
//! let mut txn = datastore.begin_transaction(&TransactionOptions::new()).unwrap();
//!
//! let mut entity = Entity::with_key(Key::with_name("Foo", "k1"));
//! entity.set_property("a", 1);
//! txn.put(&entity).unwrap();
//! txn.commit().unwrap();
//!
//! let stored = datastore.get(&Key::with_name("Foo", "k1")).unwrap().unwrap();
//! assert_eq!(stored.property("a").and_then(|v| v.as_integer()), Some(1));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod error;
mod key;
mod memory;
mod options;
mod service;
mod value;

pub use entity::Entity;
pub use error::{DatastoreError, DatastoreResult};
pub use key::{Key, KeyId};
pub use memory::{InMemoryDatastore, InMemoryTransaction, MAX_XG_GROUPS};
pub use options::TransactionOptions;
pub use service::{DatastoreService, Transaction, TxnId};
pub use value::Value;
