use bytes::Bytes;

use crate::error::{ProtocolError, Result};
use crate::message::{FieldHeader, ListHeader, MapHeader, MessageHeader, MessageType};
use crate::ttype::TType;

/// Output half of a Thrift protocol.
///
/// `*_begin`/`*_end` pairs must be balanced by the caller. Implementations may
/// buffer; nothing is guaranteed to reach the stream before [`flush`](Self::flush).
pub trait ProtocolWriter {
    fn write_message_begin(&mut self, name: &str, kind: MessageType, seq_id: i32) -> Result<()>;
    fn write_message_end(&mut self) -> Result<()>;

    fn write_struct_begin(&mut self, name: &str) -> Result<()>;
    fn write_struct_end(&mut self) -> Result<()>;

    fn write_field_begin(&mut self, name: &str, ttype: TType, id: i16) -> Result<()>;
    fn write_field_end(&mut self) -> Result<()>;
    fn write_field_stop(&mut self) -> Result<()>;

    fn write_list_begin(&mut self, elem_type: TType, size: usize) -> Result<()>;
    fn write_list_end(&mut self) -> Result<()>;
    fn write_set_begin(&mut self, elem_type: TType, size: usize) -> Result<()>;
    fn write_set_end(&mut self) -> Result<()>;
    fn write_map_begin(&mut self, key_type: TType, value_type: TType, size: usize) -> Result<()>;
    fn write_map_end(&mut self) -> Result<()>;

    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_byte(&mut self, value: i8) -> Result<()>;
    fn write_i16(&mut self, value: i16) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_i64(&mut self, value: i64) -> Result<()>;
    fn write_double(&mut self, value: f64) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    fn write_binary(&mut self, value: &[u8]) -> Result<()>;
    fn write_uuid(&mut self, value: &[u8; 16]) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// Input half of a Thrift protocol.
pub trait ProtocolReader {
    fn read_message_begin(&mut self) -> Result<MessageHeader>;
    fn read_message_end(&mut self) -> Result<()>;

    /// Returns the struct name, which the binary protocol does not transmit.
    fn read_struct_begin(&mut self) -> Result<String>;
    fn read_struct_end(&mut self) -> Result<()>;

    fn read_field_begin(&mut self) -> Result<FieldHeader>;
    fn read_field_end(&mut self) -> Result<()>;

    fn read_list_begin(&mut self) -> Result<ListHeader>;
    fn read_list_end(&mut self) -> Result<()>;
    fn read_set_begin(&mut self) -> Result<ListHeader>;
    fn read_set_end(&mut self) -> Result<()>;
    fn read_map_begin(&mut self) -> Result<MapHeader>;
    fn read_map_end(&mut self) -> Result<()>;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_byte(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
    fn read_binary(&mut self) -> Result<Bytes>;
    fn read_uuid(&mut self) -> Result<[u8; 16]>;

    /// Consume one complete value of `ttype` without materialising it.
    fn skip(&mut self, ttype: TType) -> Result<()> {
        match ttype {
            TType::Bool => {
                self.read_bool()?;
            }
            TType::Byte => {
                self.read_byte()?;
            }
            TType::Double => {
                self.read_double()?;
            }
            TType::I16 => {
                self.read_i16()?;
            }
            TType::I32 => {
                self.read_i32()?;
            }
            TType::I64 => {
                self.read_i64()?;
            }
            TType::String => {
                self.read_binary()?;
            }
            TType::Uuid => {
                self.read_uuid()?;
            }
            TType::Struct => {
                self.read_struct_begin()?;
                loop {
                    let field = self.read_field_begin()?;
                    if field.is_stop() {
                        break;
                    }
                    self.skip(field.ttype)?;
                    self.read_field_end()?;
                }
                self.read_struct_end()?;
            }
            TType::Map => {
                let header = self.read_map_begin()?;
                for _ in 0..header.size {
                    self.skip(header.key_type)?;
                    self.skip(header.value_type)?;
                }
                self.read_map_end()?;
            }
            TType::Set => {
                let header = self.read_set_begin()?;
                for _ in 0..header.size {
                    self.skip(header.elem_type)?;
                }
                self.read_set_end()?;
            }
            TType::List => {
                let header = self.read_list_begin()?;
                for _ in 0..header.size {
                    self.skip(header.elem_type)?;
                }
                self.read_list_end()?;
            }
            TType::Stop | TType::Void => return Err(ProtocolError::NotSkippable(ttype)),
        }
        Ok(())
    }
}
