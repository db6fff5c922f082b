//! Dynamic Thrift values and their codec.
//!
//! Every wire value is one of a small closed set of variants ([`Value`]):
//! bool, string, 32-bit enum, list, map and struct. Each variant writes
//! itself through a [`ProtocolWriter`](dynthrift_protocol::ProtocolWriter)
//! and is reconstructed through [`read_value`], which skips wire kinds the
//! model does not represent.
//!
//! [`Request`] and [`Response`] are the top-level envelopes of one dynamic
//! call: a field-id-to-value mapping written as the call arguments and read
//! back as the call result.

pub mod container;
pub mod dispatch;
pub mod envelope;
mod eq;
pub mod error;
pub mod scalar;
pub mod value;

pub use dispatch::{is_supported, read_value};
pub use envelope::{Request, Response, ARG_FIELD_NAME, REQUEST_STRUCT_NAME};
pub use error::{CodecError, ErrorKind, Result};
pub use value::{FieldKey, ListValue, MapValue, StructValue, Value};
