//! XA resource-manager adapters.
//!
//! The persistence runtime enlists an [`XaResource`] with its transaction
//! manager. Two implementations exist:
//! - [`DatastoreXaResource`] runs one datastore transaction per XA branch
//! - [`EmulatedXaResource`] follows the lifecycle without a datastore
//!   transaction, for connections that do not auto-create transactions
//!
//! [`resource_for`] picks between them from an [`AdapterConfig`](crate::AdapterConfig).

mod datastore;
mod emulated;
mod resource;
mod xid;

pub use datastore::DatastoreXaResource;
pub use emulated::EmulatedXaResource;
pub use resource::{resource_for, XaResource};
pub use xid::{PrepareVote, XaFlags, Xid, KVORM_FORMAT_ID};
