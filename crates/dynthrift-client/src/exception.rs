use std::fmt;

use dynthrift_protocol::{ProtocolReader, ProtocolWriter};
use dynthrift_value::container::{read_struct, write_struct};
use dynthrift_value::{StructValue, Value};

const MESSAGE_FIELD: i16 = 1;
const KIND_FIELD: i16 = 2;

/// Standard `TApplicationException` type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExceptionKind {
    Unknown = 0,
    UnknownMethod = 1,
    InvalidMessageType = 2,
    WrongMethodName = 3,
    BadSequenceId = 4,
    MissingResult = 5,
    InternalError = 6,
    ProtocolError = 7,
    InvalidTransform = 8,
    InvalidProtocol = 9,
    UnsupportedClientType = 10,
}

impl ExceptionKind {
    /// Codes outside the standard range map to `Unknown`.
    pub fn from_i32(code: i32) -> Self {
        match code {
            1 => ExceptionKind::UnknownMethod,
            2 => ExceptionKind::InvalidMessageType,
            3 => ExceptionKind::WrongMethodName,
            4 => ExceptionKind::BadSequenceId,
            5 => ExceptionKind::MissingResult,
            6 => ExceptionKind::InternalError,
            7 => ExceptionKind::ProtocolError,
            8 => ExceptionKind::InvalidTransform,
            9 => ExceptionKind::InvalidProtocol,
            10 => ExceptionKind::UnsupportedClientType,
            _ => ExceptionKind::Unknown,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            ExceptionKind::Unknown => "unknown",
            ExceptionKind::UnknownMethod => "unknown method",
            ExceptionKind::InvalidMessageType => "invalid message type",
            ExceptionKind::WrongMethodName => "wrong method name",
            ExceptionKind::BadSequenceId => "bad sequence id",
            ExceptionKind::MissingResult => "missing result",
            ExceptionKind::InternalError => "internal error",
            ExceptionKind::ProtocolError => "protocol error",
            ExceptionKind::InvalidTransform => "invalid transform",
            ExceptionKind::InvalidProtocol => "invalid protocol",
            ExceptionKind::UnsupportedClientType => "unsupported client type",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error a server reports in an EXCEPTION message.
///
/// On the wire this is a plain struct (field 1 message, field 2 type), so it
/// is read and written through the dynamic value codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApplicationException {
    pub kind: ExceptionKind,
    pub message: String,
}

impl ApplicationException {
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Decode from an exception struct. Missing fields default to an empty
    /// message and [`ExceptionKind::Unknown`].
    pub fn read<P: ProtocolReader + ?Sized>(reader: &mut P) -> dynthrift_value::Result<Self> {
        Ok(Self::from_struct(&read_struct(reader)?))
    }

    pub fn write<P: ProtocolWriter + ?Sized>(&self, writer: &mut P) -> dynthrift_value::Result<()> {
        write_struct(writer, &self.to_struct())
    }

    pub fn from_struct(value: &StructValue) -> Self {
        let message = value
            .get(MESSAGE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default();
        let kind = value
            .get(KIND_FIELD)
            .and_then(Value::as_enum)
            .map_or(ExceptionKind::Unknown, ExceptionKind::from_i32);
        Self::new(kind, message)
    }

    pub fn to_struct(&self) -> StructValue {
        StructValue::new()
            .with_name("TApplicationException")
            .with_field(MESSAGE_FIELD, "message", Value::from(self.message.as_str()))
            .with_field(KIND_FIELD, "type", Value::Enum(self.kind.as_i32()))
    }
}
