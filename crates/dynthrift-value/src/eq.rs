//! Structural equality and hashing.
//!
//! Values of different variants are never equal. Declared element, key and
//! value wire types only describe a container and are ignored here, as is a
//! struct's name.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::value::{ListValue, MapValue, StructValue, Value};

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Bool(value) => value.hash(state),
            Value::String(value) => value.hash(state),
            Value::Enum(value) => value.hash(state),
            Value::List(list) => list.hash(state),
            Value::Map(map) => map.hash(state),
            Value::Struct(value) => value.hash(state),
        }
    }
}

/// Index-wise; order matters.
impl PartialEq for ListValue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for ListValue {}

impl Hash for ListValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

/// Order-independent. With equal sizes, every key of `self` being present in
/// `other` with an equal value also covers the other direction.
impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.entries.get(key) == Some(value))
    }
}

impl Eq for MapValue {}

impl Hash for MapValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Entry hashes are summed so the result does not depend on iteration order.
        let combined = self.entries.iter().fold(0u64, |acc, (key, value)| {
            let mut entry = DefaultHasher::new();
            key.hash(&mut entry);
            value.hash(&mut entry);
            acc.wrapping_add(entry.finish())
        });
        state.write_usize(self.entries.len());
        state.write_u64(combined);
    }
}

/// Keyed by `(id, name)`.
impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for StructValue {}

impl Hash for StructValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fields.hash(state);
    }
}

impl Value {
    /// Deep equality that matches struct fields by id alone.
    ///
    /// Decoded structs carry empty field names, so comparing one against a
    /// locally built value with names needs this instead of `==`.
    pub fn equals_by_field_id(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b.iter())
                        .all(|(x, y)| x.equals_by_field_id(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        b.iter().any(|(other_key, other_value)| {
                            key.equals_by_field_id(other_key)
                                && value.equals_by_field_id(other_value)
                        })
                    })
                    && b.iter().all(|(key, value)| {
                        a.iter().any(|(other_key, other_value)| {
                            key.equals_by_field_id(other_key)
                                && value.equals_by_field_id(other_value)
                        })
                    })
            }
            (Value::Struct(a), Value::Struct(b)) => a.equals_by_field_id(b),
            _ => self == other,
        }
    }
}

impl StructValue {
    /// See [`Value::equals_by_field_id`].
    pub fn equals_by_field_id(&self, other: &StructValue) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| {
                other
                    .get(key.id)
                    .is_some_and(|other_value| value.equals_by_field_id(other_value))
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use dynthrift_protocol::TType;

    use crate::value::FieldKey;

    use super::*;

    fn bool_map(entries: &[(&str, bool)]) -> Value {
        Value::map(
            TType::String,
            TType::Bool,
            entries
                .iter()
                .map(|(key, value)| (Value::from(*key), Value::Bool(*value))),
        )
    }

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn variants_never_compare_equal() {
        assert_ne!(Value::Bool(true), Value::Enum(1));
        assert_ne!(Value::from("1"), Value::Enum(1));
        assert_ne!(
            Value::list(TType::Bool, []),
            Value::map(TType::Bool, TType::Bool, [])
        );
        assert_ne!(Value::structure([]), Value::list(TType::Struct, []));
    }

    #[test]
    fn list_equality_is_order_dependent() {
        let a = Value::list(TType::Bool, [Value::Bool(true), Value::Bool(false)]);
        let b = Value::list(TType::Bool, [Value::Bool(false), Value::Bool(true)]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn list_length_matters() {
        let a = Value::list(TType::Bool, [Value::Bool(true)]);
        let b = Value::list(TType::Bool, [Value::Bool(true), Value::Bool(true)]);
        assert_ne!(a, b);
        assert_ne!(b, a);
    }

    #[test]
    fn map_equality_is_order_independent() {
        let a = bool_map(&[("k1", true), ("k2", false)]);
        let b = bool_map(&[("k2", false), ("k1", true)]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn map_equality_is_symmetric() {
        let small = bool_map(&[("k1", true)]);
        let large = bool_map(&[("k1", true), ("k2", false)]);
        assert_ne!(small, large);
        assert_ne!(large, small);

        let other_value = bool_map(&[("k1", false)]);
        assert_ne!(small, other_value);
        assert_ne!(other_value, small);
    }

    #[test]
    fn declared_types_do_not_affect_equality() {
        let a = Value::list(TType::String, [Value::from("x")]);
        let b = Value::list(TType::Bool, [Value::from("x")]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn struct_equality_uses_id_and_name() {
        let named = Value::structure([(FieldKey::new(1, "id"), Value::from("x"))]);
        let unnamed = Value::structure([(FieldKey::unnamed(1), Value::from("x"))]);
        assert_ne!(named, unnamed);
        assert!(named.equals_by_field_id(&unnamed));
        assert!(unnamed.equals_by_field_id(&named));
    }

    #[test]
    fn equals_by_field_id_recurses() {
        let inner_named = Value::structure([(FieldKey::new(1, "flag"), Value::Bool(true))]);
        let inner_unnamed = Value::structure([(FieldKey::unnamed(1), Value::Bool(true))]);
        let a = Value::list(TType::Struct, [inner_named.clone()]);
        let b = Value::list(TType::Struct, [inner_unnamed.clone()]);
        assert!(a.equals_by_field_id(&b));

        let a = Value::map(TType::String, TType::Struct, [(Value::from("k"), inner_named)]);
        let b = Value::map(
            TType::String,
            TType::Struct,
            [(Value::from("k"), inner_unnamed)],
        );
        assert!(a.equals_by_field_id(&b));

        let different = Value::structure([(FieldKey::unnamed(2), Value::Bool(true))]);
        let c = Value::map(TType::String, TType::Struct, [(Value::from("k"), different)]);
        assert!(!a.equals_by_field_id(&c));
    }

    #[test]
    fn composite_values_work_as_keys() {
        let mut set = HashSet::new();
        set.insert(bool_map(&[("a", true), ("b", false)]));
        set.insert(Value::list(TType::I32, [Value::Enum(1), Value::Enum(2)]));
        set.insert(Value::structure([(FieldKey::unnamed(1), Value::Bool(true))]));

        assert!(set.contains(&bool_map(&[("b", false), ("a", true)])));
        assert!(set.contains(&Value::list(TType::I32, [Value::Enum(1), Value::Enum(2)])));
        assert!(!set.contains(&Value::list(TType::I32, [Value::Enum(2), Value::Enum(1)])));
        assert!(set.contains(&Value::structure([(
            FieldKey::unnamed(1),
            Value::Bool(true)
        )])));
    }
}
