use crate::error::{ProtocolError, Result};
use crate::ttype::TType;

/// Kind of a top-level Thrift message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Call = 1,
    Reply = 2,
    Exception = 3,
    Oneway = 4,
}

impl MessageType {
    pub fn from_u8(kind: u8) -> Result<Self> {
        match kind {
            1 => Ok(MessageType::Call),
            2 => Ok(MessageType::Reply),
            3 => Ok(MessageType::Exception),
            4 => Ok(MessageType::Oneway),
            other => Err(ProtocolError::UnknownMessageType(other)),
        }
    }
}

/// Message envelope header: method name, kind and sequence id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub name: String,
    pub kind: MessageType,
    pub seq_id: i32,
}

impl MessageHeader {
    pub fn new(name: impl Into<String>, kind: MessageType, seq_id: i32) -> Self {
        Self {
            name: name.into(),
            kind,
            seq_id,
        }
    }
}

/// Header of one struct field. `ttype == TType::Stop` marks the end of the field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHeader {
    /// Field name; the binary protocol never transmits it, so decoded headers carry "".
    pub name: String,
    pub ttype: TType,
    pub id: i16,
}

impl FieldHeader {
    pub fn is_stop(&self) -> bool {
        self.ttype == TType::Stop
    }
}

/// Header of a list or set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHeader {
    pub elem_type: TType,
    pub size: usize,
}

/// Header of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub key_type: TType,
    pub value_type: TType,
    pub size: usize,
}
