//! Property-based test generators using proptest.
//!
//! Provides strategies for keys, property values, entities and sequences
//! of cache operations.

use kvorm_datastore::{Entity, Key, Value};
use proptest::prelude::*;

/// Strategy for generating entity kinds.
pub fn kind_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][a-zA-Z0-9]{0,15}").expect("Invalid regex")
}

/// Strategy for generating property names.
pub fn property_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for generating root keys with an id or a name.
pub fn root_key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        (kind_strategy(), any::<i64>()).prop_map(|(kind, id)| Key::with_id(kind, id)),
        (
            kind_strategy(),
            prop::string::string_regex("[a-z0-9-]{1,16}").expect("Invalid regex"),
        )
            .prop_map(|(kind, name)| Key::with_name(kind, name)),
    ]
}

/// Strategy for generating keys, some of them with a parent.
pub fn key_strategy() -> impl Strategy<Value = Key> {
    (
        root_key_strategy(),
        prop::option::of((kind_strategy(), any::<i64>())),
    )
        .prop_map(|(root, child)| match child {
            Some((kind, id)) => root.child_with_id(kind, id),
            None => root,
        })
}

/// Strategy for generating keys from a small space, so that sequences
/// of operations hit the same key often.
pub fn small_key_strategy() -> impl Strategy<Value = Key> {
    (prop::sample::select(vec!["Foo", "Bar"]), 0i64..6)
        .prop_map(|(kind, id)| Key::with_id(kind, id))
}

fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9f64..1.0e9f64).prop_map(Value::Double),
        prop::string::string_regex("[ -~]{0,32}")
            .expect("Invalid regex")
            .prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
        root_key_strategy().prop_map(Value::Key),
    ]
}

/// Strategy for generating property values, including short lists.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => scalar_value_strategy(),
        1 => prop::collection::vec(scalar_value_strategy(), 0..4).prop_map(Value::List),
    ]
}

/// Strategy for generating an entity with the given key.
pub fn entity_with_key_strategy(key: Key) -> impl Strategy<Value = Entity> {
    prop::collection::btree_map(property_name_strategy(), value_strategy(), 0..6).prop_map(
        move |props| {
            let mut entity = Entity::with_key(key.clone());
            for (name, value) in props {
                entity.set_property(name, value);
            }
            entity
        },
    )
}

/// Strategy for generating complete entities.
pub fn entity_strategy() -> impl Strategy<Value = Entity> {
    key_strategy().prop_flat_map(entity_with_key_strategy)
}

/// Strategy for generating entities keyed from [`small_key_strategy`].
pub fn small_entity_strategy() -> impl Strategy<Value = Entity> {
    small_key_strategy().prop_flat_map(entity_with_key_strategy)
}

/// An operation recorded into a transaction cache.
#[derive(Debug, Clone)]
pub enum CacheOperation {
    /// Record a written entity.
    Put {
        /// The entity written.
        entity: Entity,
    },
    /// Record a deleted key.
    Delete {
        /// The key deleted.
        key: Key,
    },
}

/// Strategy for generating cache operations over a small key space.
pub fn cache_operation_strategy() -> impl Strategy<Value = CacheOperation> {
    prop_oneof![
        3 => small_entity_strategy().prop_map(|entity| CacheOperation::Put { entity }),
        1 => small_key_strategy().prop_map(|key| CacheOperation::Delete { key }),
    ]
}

/// Strategy for generating a sequence of cache operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<CacheOperation>> {
    prop::collection::vec(cache_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_entities_have_keys(entity in entity_strategy()) {
            let key = entity.key().expect("generated entity has a key");
            prop_assert_eq!(key.kind(), entity.kind());
        }

        #[test]
        fn small_keys_are_roots(key in small_key_strategy()) {
            prop_assert!(key.is_root());
            prop_assert!(key.kind() == "Foo" || key.kind() == "Bar");
        }

        #[test]
        fn kinds_start_uppercase(kind in kind_strategy()) {
            let first = kind.chars().next();
            prop_assert!(first.map_or(false, |c| c.is_ascii_uppercase()));
        }
    }
}
