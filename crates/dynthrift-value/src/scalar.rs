//! Bool, string and enum payloads: one primitive call each.

use dynthrift_protocol::{ProtocolReader, ProtocolWriter};

use crate::error::{Result, ResultExt};
use crate::value::Value;

pub fn write_bool<P: ProtocolWriter + ?Sized>(writer: &mut P, value: bool) -> Result<()> {
    writer.write_bool(value).context(|| "write bool")
}

pub fn write_string<P: ProtocolWriter + ?Sized>(writer: &mut P, value: &str) -> Result<()> {
    writer.write_string(value).context(|| "write string")
}

pub fn write_enum<P: ProtocolWriter + ?Sized>(writer: &mut P, value: i32) -> Result<()> {
    writer.write_i32(value).context(|| "write enum")
}

pub fn read_bool<P: ProtocolReader + ?Sized>(reader: &mut P) -> Result<Value> {
    let value = reader.read_bool().context(|| "read bool")?;
    Ok(Value::Bool(value))
}

pub fn read_string<P: ProtocolReader + ?Sized>(reader: &mut P) -> Result<Value> {
    let value = reader.read_string().context(|| "read string")?;
    Ok(Value::String(value))
}

pub fn read_enum<P: ProtocolReader + ?Sized>(reader: &mut P) -> Result<Value> {
    let value = reader.read_i32().context(|| "read enum")?;
    Ok(Value::Enum(value))
}
