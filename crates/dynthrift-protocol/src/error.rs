use crate::ttype::TType;

/// Errors that can occur while reading or writing the Thrift binary protocol.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// An I/O error occurred on the underlying stream.
    #[error("protocol I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended in the middle of a value.
    #[error("unexpected end of stream (truncated payload)")]
    UnexpectedEof,

    /// The stream accepted zero bytes while data was still pending.
    #[error("connection closed while writing")]
    ConnectionClosed,

    /// A length or element count on the wire was negative.
    #[error("negative {what} size: {size}")]
    NegativeSize { what: &'static str, size: i32 },

    /// A length or element count exceeds the configured limit.
    #[error("{what} size {size} exceeds limit {max}")]
    SizeLimit {
        what: &'static str,
        size: usize,
        max: usize,
    },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBool(u8),

    /// A string payload was not valid UTF-8.
    #[error("string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A type tag byte does not name any Thrift wire type.
    #[error("unknown wire type tag {0}")]
    UnknownType(u8),

    /// A message type byte does not name any Thrift message type.
    #[error("unknown message type {0}")]
    UnknownMessageType(u8),

    /// A strict message header carried an unsupported version.
    #[error("bad protocol version 0x{0:08x}")]
    BadVersion(u32),

    /// Strict reading is enabled but the message header had no version.
    #[error("missing protocol version in message header")]
    MissingVersion,

    /// Nested containers exceed the configured depth.
    #[error("nesting depth exceeds limit {0}")]
    DepthLimit(usize),

    /// `skip` was asked to consume a tag that has no payload definition.
    #[error("cannot skip wire type {0}")]
    NotSkippable(TType),

    /// A transport frame exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },
}

impl ProtocolError {
    /// True for failures of the underlying stream rather than of the data on it.
    pub fn is_transport(&self) -> bool {
        matches!(self, ProtocolError::Io(_) | ProtocolError::ConnectionClosed)
    }

    pub(crate) fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::UnexpectedEof
        } else {
            ProtocolError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
