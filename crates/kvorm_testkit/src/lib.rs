//! # kvorm Testkit
//!
//! Test utilities for kvorm.
//!
//! This crate provides:
//! - A datastore with scripted failures ([`ScriptedDatastore`])
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use kvorm_datastore::{DatastoreError, DatastoreService, Transaction, TransactionOptions};
//! use kvorm_testkit::prelude::*;
//!
//! let datastore = ScriptedDatastore::new();
//! datastore.fail_next_commit(DatastoreError::concurrent_modification("scripted"));
//!
//! let mut txn = datastore.begin_transaction(&TransactionOptions::new()).unwrap();
//! assert!(txn.commit().unwrap_err().is_conflict());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
