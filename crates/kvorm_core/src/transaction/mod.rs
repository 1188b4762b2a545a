//! Transaction-scoped state.
//!
//! A [`TransactionCache`] wraps one datastore transaction for its whole
//! lifetime and remembers the writes issued inside it, giving the
//! persistence runtime read-your-writes over a datastore that only serves
//! committed state.

mod cache;

pub use cache::TransactionCache;
