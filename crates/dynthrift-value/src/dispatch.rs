use dynthrift_protocol::{ProtocolReader, TType};

use crate::container;
use crate::error::{Result, ResultExt};
use crate::scalar;
use crate::value::Value;

/// Whether values of `ttype` are decoded rather than skipped.
pub fn is_supported(ttype: TType) -> bool {
    matches!(
        ttype,
        TType::Bool | TType::String | TType::I32 | TType::List | TType::Map | TType::Struct
    )
}

/// Decode one value whose wire type is `ttype`.
///
/// This is the decode entry point for every nested site: list elements, map
/// keys and values, struct fields and top-level response fields. Wire types
/// the value model does not represent are consumed with
/// [`ProtocolReader::skip`] and yield `Ok(None)`, so a payload carrying extra
/// fields of other kinds still decodes.
pub fn read_value<P: ProtocolReader + ?Sized>(ttype: TType, reader: &mut P) -> Result<Option<Value>> {
    let value = match ttype {
        TType::Bool => scalar::read_bool(reader)?,
        TType::String => scalar::read_string(reader)?,
        TType::I32 => scalar::read_enum(reader)?,
        TType::List => Value::List(container::read_list(reader)?),
        TType::Map => Value::Map(container::read_map(reader)?),
        TType::Struct => Value::Struct(container::read_struct(reader)?),
        TType::Stop
        | TType::Void
        | TType::Byte
        | TType::Double
        | TType::I16
        | TType::I64
        | TType::Set
        | TType::Uuid => {
            tracing::debug!(ttype = %ttype, "skipping unsupported wire type");
            reader.skip(ttype).context(|| format!("skip {ttype}"))?;
            return Ok(None);
        }
    };
    Ok(Some(value))
}
