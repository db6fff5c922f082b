//! List, map and struct payloads.
//!
//! Each container recurses into [`Value::write_field_data`] on write and
//! into [`read_value`] on read, so nesting depth is bounded only by the
//! reader's configured limit.

use std::collections::HashMap;

use dynthrift_protocol::{FieldHeader, ProtocolReader, ProtocolWriter, TType};

use crate::dispatch::read_value;
use crate::error::{Result, ResultExt};
use crate::value::{FieldKey, ListValue, MapValue, StructValue, Value};

/// Upper bound on capacity reserved up front from a size read off the wire.
const MAX_PREALLOC: usize = 1024;

pub fn write_list<P: ProtocolWriter + ?Sized>(writer: &mut P, list: &ListValue) -> Result<()> {
    writer
        .write_list_begin(list.elem_type, list.items.len())
        .context(|| format!("write list header ({})", list.elem_type))?;
    for (index, item) in list.items.iter().enumerate() {
        item.write_field_data(writer)
            .context(|| format!("write list element {index} ({})", item.ttype()))?;
    }
    writer.write_list_end().context(|| "write list end")
}

pub fn read_list<P: ProtocolReader + ?Sized>(reader: &mut P) -> Result<ListValue> {
    let header = reader.read_list_begin().context(|| "read list header")?;
    let mut items = Vec::with_capacity(header.size.min(MAX_PREALLOC));
    for index in 0..header.size {
        let item = read_value(header.elem_type, reader)
            .context(|| format!("read list element {index} ({})", header.elem_type))?;
        if let Some(item) = item {
            items.push(item);
        }
    }
    reader.read_list_end().context(|| "read list end")?;
    Ok(ListValue {
        elem_type: header.elem_type,
        items,
    })
}

/// Entries go out in the map's iteration order, which is unspecified.
pub fn write_map<P: ProtocolWriter + ?Sized>(writer: &mut P, map: &MapValue) -> Result<()> {
    writer
        .write_map_begin(map.key_type, map.value_type, map.entries.len())
        .context(|| format!("write map header ({}, {})", map.key_type, map.value_type))?;
    for (key, value) in &map.entries {
        key.write_field_data(writer)
            .context(|| format!("write map key ({})", key.ttype()))?;
        value
            .write_field_data(writer)
            .context(|| format!("write map value ({})", value.ttype()))?;
    }
    writer.write_map_end().context(|| "write map end")
}

/// Entries whose key or value is a skipped wire type are dropped.
pub fn read_map<P: ProtocolReader + ?Sized>(reader: &mut P) -> Result<MapValue> {
    let header = reader.read_map_begin().context(|| "read map header")?;
    let mut entries = HashMap::with_capacity(header.size.min(MAX_PREALLOC));
    for index in 0..header.size {
        let key = read_value(header.key_type, reader)
            .context(|| format!("read map key {index} ({})", header.key_type))?;
        let value = read_value(header.value_type, reader)
            .context(|| format!("read map value {index} ({})", header.value_type))?;
        if let (Some(key), Some(value)) = (key, value) {
            entries.insert(key, value);
        }
    }
    reader.read_map_end().context(|| "read map end")?;
    Ok(MapValue {
        key_type: header.key_type,
        value_type: header.value_type,
        entries,
    })
}

/// Fields are written in ascending id order, then the field stop.
pub fn write_struct<P: ProtocolWriter + ?Sized>(writer: &mut P, value: &StructValue) -> Result<()> {
    writer
        .write_struct_begin(&value.name)
        .context(|| "write struct begin")?;
    for (key, field) in &value.fields {
        field.write_field(writer, key.id, &key.name)?;
    }
    writer.write_field_stop().context(|| "write field stop")?;
    writer.write_struct_end().context(|| "write struct end")
}

pub fn read_struct<P: ProtocolReader + ?Sized>(reader: &mut P) -> Result<StructValue> {
    let mut value = StructValue::new();
    let name = read_fields(reader, |header, field| {
        value.insert(FieldKey::new(header.id, header.name), field);
    })?;
    value.name = name;
    Ok(value)
}

/// Decode a field list up to its stop marker, handing each decoded field to
/// `visit` in wire order. Fields of skipped wire types are not visited.
///
/// Returns the struct name reported by the reader.
pub(crate) fn read_fields<P, F>(reader: &mut P, mut visit: F) -> Result<String>
where
    P: ProtocolReader + ?Sized,
    F: FnMut(FieldHeader, Value),
{
    let name = reader.read_struct_begin().context(|| "read struct begin")?;
    loop {
        let header = reader.read_field_begin().context(|| "read field header")?;
        if header.is_stop() {
            break;
        }
        let (id, ttype) = (header.id, header.ttype);
        let value = read_value(ttype, reader)
            .context(|| format!("read struct field {id} ({ttype})"))?;
        reader
            .read_field_end()
            .context(|| format!("read field {id} end"))?;
        match value {
            Some(value) => {
                tracing::trace!(field_id = id, ttype = %ttype, "decoded field");
                visit(header, value);
            }
            None => tracing::debug!(field_id = id, ttype = %ttype, "skipped field"),
        }
    }
    reader.read_struct_end().context(|| "read struct end")?;
    Ok(name)
}
