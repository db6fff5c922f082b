use std::collections::{BTreeMap, HashMap};
use std::fmt;

use dynthrift_protocol::{ProtocolWriter, TType};

use crate::container;
use crate::error::{Result, ResultExt};
use crate::scalar;

/// A dynamically typed Thrift value.
///
/// Only the kinds a dynamic call needs are modelled. Containers own their
/// children, so a value is always a tree.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    String(String),
    /// A 32-bit integer, used on the wire for enums.
    Enum(i32),
    List(ListValue),
    Map(MapValue),
    Struct(StructValue),
}

/// Identity of a struct field: id plus an optional name.
///
/// The binary protocol does not transmit names, so decoded keys carry an
/// empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    pub id: i16,
    pub name: String,
}

impl FieldKey {
    pub fn new(id: i16, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// A key with an empty name, as produced by the decoder.
    pub fn unnamed(id: i16) -> Self {
        Self::new(id, String::new())
    }
}

impl From<i16> for FieldKey {
    fn from(id: i16) -> Self {
        Self::unnamed(id)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}:{}", self.id, self.name)
        }
    }
}

/// An ordered sequence of values with a declared element wire type.
///
/// The element type describes the items but is not checked against them.
#[derive(Debug, Clone)]
pub struct ListValue {
    pub(crate) elem_type: TType,
    pub(crate) items: Vec<Value>,
}

impl ListValue {
    pub fn new(elem_type: TType, items: impl IntoIterator<Item = Value>) -> Self {
        Self {
            elem_type,
            items: items.into_iter().collect(),
        }
    }

    pub fn elem_type(&self) -> TType {
        self.elem_type
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

/// An associative mapping from value to value with declared key/value wire types.
///
/// Iteration order is unspecified, and so is the order entries are written in.
#[derive(Debug, Clone)]
pub struct MapValue {
    pub(crate) key_type: TType,
    pub(crate) value_type: TType,
    pub(crate) entries: HashMap<Value, Value>,
}

impl MapValue {
    /// Build a map. A repeated key keeps the last value.
    pub fn new(
        key_type: TType,
        value_type: TType,
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Self {
        Self {
            key_type,
            value_type,
            entries: entries.into_iter().collect(),
        }
    }

    pub fn key_type(&self) -> TType {
        self.key_type
    }

    pub fn value_type(&self) -> TType {
        self.value_type
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, Value, Value> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> HashMap<Value, Value> {
        self.entries
    }
}

/// A struct: fields keyed by `(id, name)`, unique by id, kept in id order.
#[derive(Debug, Clone, Default)]
pub struct StructValue {
    pub(crate) name: String,
    pub(crate) fields: BTreeMap<FieldKey, Value>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a struct from fields. A later field with an id already present
    /// replaces the earlier one.
    pub fn from_fields(fields: impl IntoIterator<Item = (FieldKey, Value)>) -> Self {
        let mut value = Self::new();
        for (key, field) in fields {
            value.insert(key, field);
        }
        value
    }

    /// Builder form of [`from_fields`](Self::from_fields) for one field.
    pub fn with_field(mut self, id: i16, name: impl Into<String>, value: Value) -> Self {
        self.insert(FieldKey::new(id, name), value);
        self
    }

    /// Set the struct name passed to `write_struct_begin`. The binary
    /// protocol does not transmit it.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field with the given id, whatever its name.
    pub fn get(&self, id: i16) -> Option<&Value> {
        self.entry(id).map(|(_, value)| value)
    }

    /// Field with exactly this `(id, name)` key.
    pub fn get_field(&self, key: &FieldKey) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in ascending id order.
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, FieldKey, Value> {
        self.fields.iter()
    }

    pub fn into_fields(self) -> BTreeMap<FieldKey, Value> {
        self.fields
    }

    /// Write this struct as a complete field: header, payload, trailer.
    pub fn write_field<P>(&self, writer: &mut P, id: i16, name: &str) -> Result<()>
    where
        P: ProtocolWriter + ?Sized,
    {
        writer
            .write_field_begin(name, TType::Struct, id)
            .context(|| format!("write field {id} header (struct)"))?;
        container::write_struct(writer, self).context(|| format!("write field {id} (struct)"))?;
        writer
            .write_field_end()
            .context(|| format!("write field {id} trailer (struct)"))
    }

    pub(crate) fn insert(&mut self, key: FieldKey, value: Value) -> Option<Value> {
        let existing = self.entry(key.id).map(|(existing, _)| existing.clone());
        let previous = existing.and_then(|existing| self.fields.remove(&existing));
        self.fields.insert(key, value);
        previous
    }

    fn entry(&self, id: i16) -> Option<(&FieldKey, &Value)> {
        self.fields
            .range(FieldKey::unnamed(id)..)
            .next()
            .filter(|(key, _)| key.id == id)
    }
}

impl Value {
    pub fn list(elem_type: TType, items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(ListValue::new(elem_type, items))
    }

    pub fn map(
        key_type: TType,
        value_type: TType,
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Self {
        Value::Map(MapValue::new(key_type, value_type, entries))
    }

    pub fn structure(fields: impl IntoIterator<Item = (FieldKey, Value)>) -> Self {
        Value::Struct(StructValue::from_fields(fields))
    }

    /// Wire type this value is written as.
    pub fn ttype(&self) -> TType {
        match self {
            Value::Bool(_) => TType::Bool,
            Value::String(_) => TType::String,
            Value::Enum(_) => TType::I32,
            Value::List(_) => TType::List,
            Value::Map(_) => TType::Map,
            Value::Struct(_) => TType::Struct,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<i32> {
        match self {
            Value::Enum(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(value) => Some(value),
            _ => None,
        }
    }

    /// Write only the payload, without a field envelope.
    pub fn write_field_data<P>(&self, writer: &mut P) -> Result<()>
    where
        P: ProtocolWriter + ?Sized,
    {
        match self {
            Value::Bool(value) => scalar::write_bool(writer, *value),
            Value::String(value) => scalar::write_string(writer, value),
            Value::Enum(value) => scalar::write_enum(writer, *value),
            Value::List(list) => container::write_list(writer, list),
            Value::Map(map) => container::write_map(writer, map),
            Value::Struct(value) => container::write_struct(writer, value),
        }
    }

    /// Write this value as a struct field with the given id and name.
    pub fn write_field<P>(&self, writer: &mut P, id: i16, name: &str) -> Result<()>
    where
        P: ProtocolWriter + ?Sized,
    {
        if let Value::Struct(value) = self {
            return value.write_field(writer, id, name);
        }
        let ttype = self.ttype();
        writer
            .write_field_begin(name, ttype, id)
            .context(|| format!("write field {id} header ({ttype})"))?;
        self.write_field_data(writer)
            .context(|| format!("write field {id} ({ttype})"))?;
        writer
            .write_field_end()
            .context(|| format!("write field {id} trailer ({ttype})"))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Enum(value)
    }
}

impl From<ListValue> for Value {
    fn from(value: ListValue) -> Self {
        Value::List(value)
    }
}

impl From<MapValue> for Value {
    fn from(value: MapValue) -> Self {
        Value::Map(value)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Value::Struct(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Enum(value) => write!(f, "{value}"),
            Value::List(list) => fmt::Display::fmt(list, f),
            Value::Map(map) => fmt::Display::fmt(map, f),
            Value::Struct(value) => fmt::Display::fmt(value, f),
        }
    }
}

impl fmt::Display for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sorted so equal maps render identically.
        let mut entries: Vec<String> = self
            .entries
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        entries.sort();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

impl fmt::Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (key, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}
