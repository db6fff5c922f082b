//! Thrift binary protocol plumbing for dynamic payloads.
//!
//! This is the lowest layer of dynthrift. It knows nothing about values,
//! only about the wire:
//! - [`TType`] tags and message headers
//! - the [`ProtocolWriter`] / [`ProtocolReader`] capability traits
//! - the Apache Thrift binary encoding ([`BinaryProtocolWriter`], [`BinaryProtocolReader`])
//! - the 4-byte length-prefixed framed transport
//!
//! Everything above (value codec, envelopes, client) drives these traits.

pub mod binary;
pub mod config;
pub mod error;
pub mod framed;
pub mod message;
pub mod traits;
pub mod ttype;

pub use binary::{BinaryProtocolReader, BinaryProtocolWriter, VERSION_1, VERSION_MASK};
pub use config::ProtocolConfig;
pub use error::{ProtocolError, Result};
pub use framed::{decode_frame, encode_frame, FramedReader, FramedWriter, FRAME_HEADER_SIZE};
pub use message::{FieldHeader, ListHeader, MapHeader, MessageHeader, MessageType};
pub use traits::{ProtocolReader, ProtocolWriter};
pub use ttype::{ParseTTypeError, TType};
