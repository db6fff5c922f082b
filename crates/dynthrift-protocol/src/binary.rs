use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::ProtocolConfig;
use crate::error::{ProtocolError, Result};
use crate::message::{FieldHeader, ListHeader, MapHeader, MessageHeader, MessageType};
use crate::traits::{ProtocolReader, ProtocolWriter};
use crate::ttype::TType;

/// Version word of strict message headers.
pub const VERSION_1: u32 = 0x8001_0000;

/// Mask selecting the version bits of a strict message header.
pub const VERSION_MASK: u32 = 0xffff_0000;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes the Thrift binary protocol to any `Write` stream.
///
/// Encoded bytes accumulate in an internal buffer and reach the stream on
/// [`flush`](ProtocolWriter::flush) or [`finish`](Self::finish).
///
/// Wire layout of the pieces this writer emits:
/// ```text
/// field header   type (1B) | id (2B BE)
/// field stop     0x00
/// list / set     elem type (1B) | size (4B BE)
/// map            key type (1B) | value type (1B) | size (4B BE)
/// string         length (4B BE) | UTF-8 bytes
/// message        0x8001 | 0x00 | kind (1B) | name (string) | seq id (4B BE)
/// ```
/// Struct begin/end and field/list/map end markers produce no bytes.
pub struct BinaryProtocolWriter<W> {
    inner: W,
    buf: BytesMut,
    config: ProtocolConfig,
}

impl<W: Write> BinaryProtocolWriter<W> {
    /// Create a writer with default configuration.
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, ProtocolConfig::default())
    }

    /// Create a writer with explicit configuration.
    pub fn with_config(inner: W, config: ProtocolConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Bytes encoded but not yet flushed.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Flush pending bytes and return the inner stream.
    pub fn finish(mut self) -> Result<W> {
        ProtocolWriter::flush(&mut self)?;
        Ok(self.inner)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    fn put_size(&mut self, what: &'static str, size: usize) -> Result<()> {
        let size = i32::try_from(size).map_err(|_| ProtocolError::SizeLimit {
            what,
            size,
            max: i32::MAX as usize,
        })?;
        self.buf.put_i32(size);
        Ok(())
    }
}

impl<W: Write> ProtocolWriter for BinaryProtocolWriter<W> {
    fn write_message_begin(&mut self, name: &str, kind: MessageType, seq_id: i32) -> Result<()> {
        if self.config.strict_write {
            self.buf.put_u32(VERSION_1 | kind as u32);
            self.write_string(name)?;
        } else {
            self.write_string(name)?;
            self.buf.put_u8(kind as u8);
        }
        self.buf.put_i32(seq_id);
        Ok(())
    }

    fn write_message_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_struct_begin(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_begin(&mut self, _name: &str, ttype: TType, id: i16) -> Result<()> {
        self.buf.put_u8(ttype.as_u8());
        self.buf.put_i16(id);
        Ok(())
    }

    fn write_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<()> {
        self.buf.put_u8(TType::Stop.as_u8());
        Ok(())
    }

    fn write_list_begin(&mut self, elem_type: TType, size: usize) -> Result<()> {
        self.buf.put_u8(elem_type.as_u8());
        self.put_size("list", size)
    }

    fn write_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_set_begin(&mut self, elem_type: TType, size: usize) -> Result<()> {
        self.buf.put_u8(elem_type.as_u8());
        self.put_size("set", size)
    }

    fn write_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_map_begin(&mut self, key_type: TType, value_type: TType, size: usize) -> Result<()> {
        self.buf.put_u8(key_type.as_u8());
        self.buf.put_u8(value_type.as_u8());
        self.put_size("map", size)
    }

    fn write_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.buf.put_u8(u8::from(value));
        Ok(())
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.buf.put_i8(value);
        Ok(())
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.buf.put_i16(value);
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.buf.put_i32(value);
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.buf.put_i64(value);
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.buf.put_f64(value);
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_binary(value.as_bytes())
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<()> {
        self.put_size("string", value.len())?;
        self.buf.put_slice(value);
        Ok(())
    }

    fn write_uuid(&mut self, value: &[u8; 16]) -> Result<()> {
        self.buf.put_slice(value);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(ProtocolError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                // A socket write timeout shows up as WouldBlock or TimedOut.
                Err(err) => return Err(ProtocolError::Io(err)),
            }
        }
        self.buf.clear();

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtocolError::Io(err)),
            }
        }
    }
}

/// Reads the Thrift binary protocol from any `Read` stream.
///
/// Tracks container nesting so hostile payloads cannot recurse past
/// [`ProtocolConfig::max_depth`].
pub struct BinaryProtocolReader<R> {
    inner: R,
    config: ProtocolConfig,
    depth: usize,
}

impl<R: Read> BinaryProtocolReader<R> {
    /// Create a reader with default configuration.
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, ProtocolConfig::default())
    }

    /// Create a reader with explicit configuration.
    pub fn with_config(inner: R, config: ProtocolConfig) -> Self {
        Self {
            inner,
            config,
            depth: 0,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Number of containers currently open.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < buf.len() {
            match self.inner.read(&mut buf[offset..]) {
                Ok(0) => return Err(ProtocolError::UnexpectedEof),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtocolError::from_read(err)),
            }
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn read_size(&mut self, what: &'static str, max: usize) -> Result<usize> {
        let size = self.read_i32()?;
        if size < 0 {
            return Err(ProtocolError::NegativeSize { what, size });
        }
        let size = size as usize;
        if size > max {
            return Err(ProtocolError::SizeLimit { what, size, max });
        }
        Ok(size)
    }

    fn read_ttype(&mut self) -> Result<TType> {
        let [tag] = self.read_array::<1>()?;
        TType::from_u8(tag)
    }

    fn read_bytes(&mut self, len: usize) -> Result<BytesMut> {
        let mut buf = BytesMut::zeroed(len);
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(ProtocolError::DepthLimit(self.config.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl<R: Read> ProtocolReader for BinaryProtocolReader<R> {
    fn read_message_begin(&mut self) -> Result<MessageHeader> {
        let word = self.read_i32()?;
        if word < 0 {
            let word = word as u32;
            if word & VERSION_MASK != VERSION_1 {
                return Err(ProtocolError::BadVersion(word));
            }
            let kind = MessageType::from_u8((word & 0xff) as u8)?;
            let name = self.read_string()?;
            let seq_id = self.read_i32()?;
            return Ok(MessageHeader { name, kind, seq_id });
        }

        if self.config.strict_read {
            return Err(ProtocolError::MissingVersion);
        }
        // Old-style header: the first word is the name length.
        let len = word as usize;
        if len > self.config.max_string_size {
            return Err(ProtocolError::SizeLimit {
                what: "string",
                size: len,
                max: self.config.max_string_size,
            });
        }
        let name = String::from_utf8(self.read_bytes(len)?.to_vec())?;
        let kind = MessageType::from_u8(self.read_byte()? as u8)?;
        let seq_id = self.read_i32()?;
        Ok(MessageHeader { name, kind, seq_id })
    }

    fn read_message_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_struct_begin(&mut self) -> Result<String> {
        self.enter()?;
        Ok(String::new())
    }

    fn read_struct_end(&mut self) -> Result<()> {
        self.leave();
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldHeader> {
        let ttype = self.read_ttype()?;
        let id = if ttype == TType::Stop {
            0
        } else {
            self.read_i16()?
        };
        Ok(FieldHeader {
            name: String::new(),
            ttype,
            id,
        })
    }

    fn read_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<ListHeader> {
        let elem_type = self.read_ttype()?;
        let size = self.read_size("list", self.config.max_container_size)?;
        self.enter()?;
        Ok(ListHeader { elem_type, size })
    }

    fn read_list_end(&mut self) -> Result<()> {
        self.leave();
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<ListHeader> {
        let elem_type = self.read_ttype()?;
        let size = self.read_size("set", self.config.max_container_size)?;
        self.enter()?;
        Ok(ListHeader { elem_type, size })
    }

    fn read_set_end(&mut self) -> Result<()> {
        self.leave();
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<MapHeader> {
        let key_type = self.read_ttype()?;
        let value_type = self.read_ttype()?;
        let size = self.read_size("map", self.config.max_container_size)?;
        self.enter()?;
        Ok(MapHeader {
            key_type,
            value_type,
            size,
        })
    }

    fn read_map_end(&mut self) -> Result<()> {
        self.leave();
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        match self.read_array::<1>()? {
            [0] => Ok(false),
            [1] => Ok(true),
            [other] => Err(ProtocolError::InvalidBool(other)),
        }
    }

    fn read_byte(&mut self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_binary()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn read_binary(&mut self) -> Result<Bytes> {
        let len = self.read_size("string", self.config.max_string_size)?;
        Ok(self.read_bytes(len)?.freeze())
    }

    fn read_uuid(&mut self) -> Result<[u8; 16]> {
        self.read_array()
    }
}
