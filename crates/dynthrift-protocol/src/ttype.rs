use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};

/// Wire type tag identifying how a field, element or entry is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TType {
    Stop = 0,
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    /// Strings and binary share this tag.
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
    Uuid = 16,
}

impl TType {
    /// Decode a tag byte.
    pub fn from_u8(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => TType::Stop,
            1 => TType::Void,
            2 => TType::Bool,
            3 => TType::Byte,
            4 => TType::Double,
            6 => TType::I16,
            8 => TType::I32,
            10 => TType::I64,
            11 => TType::String,
            12 => TType::Struct,
            13 => TType::Map,
            14 => TType::Set,
            15 => TType::List,
            16 => TType::Uuid,
            other => return Err(ProtocolError::UnknownType(other)),
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Lower-case name used in diagnostics and the CLI notation.
    pub fn name(self) -> &'static str {
        match self {
            TType::Stop => "stop",
            TType::Void => "void",
            TType::Bool => "bool",
            TType::Byte => "byte",
            TType::Double => "double",
            TType::I16 => "i16",
            TType::I32 => "i32",
            TType::I64 => "i64",
            TType::String => "string",
            TType::Struct => "struct",
            TType::Map => "map",
            TType::Set => "set",
            TType::List => "list",
            TType::Uuid => "uuid",
        }
    }
}

impl fmt::Display for TType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing a wire type name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown wire type name {0:?}")]
pub struct ParseTTypeError(pub String);

impl FromStr for TType {
    type Err = ParseTTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "stop" => TType::Stop,
            "void" => TType::Void,
            "bool" => TType::Bool,
            "byte" | "i8" => TType::Byte,
            "double" => TType::Double,
            "i16" => TType::I16,
            "i32" | "enum" => TType::I32,
            "i64" => TType::I64,
            "string" | "binary" => TType::String,
            "struct" => TType::Struct,
            "map" => TType::Map,
            "set" => TType::Set,
            "list" => TType::List,
            "uuid" => TType::Uuid,
            _ => return Err(ParseTTypeError(s.to_string())),
        })
    }
}
