//! Entity keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifying part of a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyId {
    /// Numeric identifier.
    Id(i64),
    /// Application-assigned name.
    Name(String),
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Id(id) => write!(f, "{id}"),
            KeyId::Name(name) => write!(f, "{name:?}"),
        }
    }
}

/// Unique identifier for an entity.
///
/// A key names the entity's kind and id, and optionally a parent key.
/// Keys sharing the same root belong to the same entity group, which is
/// the unit of optimistic concurrency in the datastore.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    parent: Option<Box<Key>>,
    kind: String,
    id: KeyId,
}

impl Key {
    /// Creates a root key with a numeric id.
    #[must_use]
    pub fn with_id(kind: impl Into<String>, id: i64) -> Self {
        Self {
            parent: None,
            kind: kind.into(),
            id: KeyId::Id(id),
        }
    }

    /// Creates a root key with a name.
    #[must_use]
    pub fn with_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            parent: None,
            kind: kind.into(),
            id: KeyId::Name(name.into()),
        }
    }

    /// Creates a child key with a numeric id under this key.
    #[must_use]
    pub fn child_with_id(&self, kind: impl Into<String>, id: i64) -> Self {
        Self {
            parent: Some(Box::new(self.clone())),
            kind: kind.into(),
            id: KeyId::Id(id),
        }
    }

    /// Creates a child key with a name under this key.
    #[must_use]
    pub fn child_with_name(&self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            parent: Some(Box::new(self.clone())),
            kind: kind.into(),
            id: KeyId::Name(name.into()),
        }
    }

    /// Returns the kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the id or name.
    #[must_use]
    pub fn id(&self) -> &KeyId {
        &self.id
    }

    /// Returns the parent key, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Key> {
        self.parent.as_deref()
    }

    /// Returns the root of this key's entity group.
    #[must_use]
    pub fn root(&self) -> &Key {
        let mut key = self;
        while let Some(parent) = key.parent() {
            key = parent;
        }
        key
    }

    /// Returns true if this key has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{parent}/")?;
        }
        write!(f, "{}({})", self.kind, self.id)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({self})")
    }
}
