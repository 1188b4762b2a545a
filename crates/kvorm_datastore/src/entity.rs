//! Entity records.

use crate::key::Key;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single datastore record: a kind, an optional key, and named properties.
///
/// An entity without a key is *incomplete*. Incomplete entities can hold
/// data but cannot be written to the datastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    kind: String,
    key: Option<Key>,
    properties: BTreeMap<String, Value>,
}

impl Entity {
    /// Creates an empty, keyless entity of the given kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: None,
            properties: BTreeMap::new(),
        }
    }

    /// Creates an empty entity with the given key. The kind is taken from the key.
    #[must_use]
    pub fn with_key(key: Key) -> Self {
        Self {
            kind: key.kind().to_string(),
            key: Some(key),
            properties: BTreeMap::new(),
        }
    }

    /// Returns the kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the key, or `None` for an incomplete entity.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Gets a property value.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Sets a property, replacing any previous value.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Removes a property, returning its previous value.
    pub fn remove_property(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    /// Returns true if the property is set.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Returns all properties in name order.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Copies every property of `source` onto this entity.
    ///
    /// Properties already present here are overwritten; the key is never copied.
    pub fn copy_properties_from(&mut self, source: &Entity) {
        for (name, value) in &source.properties {
            self.properties.insert(name.clone(), value.clone());
        }
    }

    /// Returns a keyless copy with the same kind and properties.
    #[must_use]
    pub fn snapshot(&self) -> Entity {
        let mut copy = Entity::new(self.kind.clone());
        copy.copy_properties_from(self);
        copy
    }
}
