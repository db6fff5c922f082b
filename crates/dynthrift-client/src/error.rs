use std::io::ErrorKind;

use dynthrift_protocol::{MessageType, ProtocolError};
use dynthrift_value::CodecError;

use crate::exception::ApplicationException;

/// Errors that can occur while performing a dynamic call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Encoding the request or decoding the reply failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Reading or writing a message header failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Socket setup failed after connecting.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered with an EXCEPTION message.
    #[error("remote exception: {0}")]
    Application(ApplicationException),

    /// The reply was neither REPLY nor EXCEPTION.
    #[error("unexpected message type {0:?} in reply")]
    UnexpectedMessageType(MessageType),

    /// The reply names a different method than the call.
    #[error("wrong method name in reply: expected '{expected}', got '{actual}'")]
    WrongMethodName { expected: String, actual: String },

    /// The reply carries a different sequence id than the call.
    #[error("bad sequence id in reply: expected {expected}, got {actual}")]
    BadSequenceId { expected: i32, actual: i32 },
}

impl ClientError {
    /// True when the underlying stream failed rather than the data on it.
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::Connect { .. } | ClientError::Io(_) => true,
            ClientError::Protocol(err) => err.is_transport(),
            ClientError::Codec(err) => err.kind() == dynthrift_value::ErrorKind::Transport,
            _ => false,
        }
    }

    /// True when a socket read or write timed out.
    pub fn is_timeout(&self) -> bool {
        self.io_error()
            .is_some_and(|err| matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock))
    }

    fn io_error(&self) -> Option<&std::io::Error> {
        let protocol = match self {
            ClientError::Connect { source, .. } => return Some(source),
            ClientError::Io(err) => return Some(err),
            ClientError::Protocol(err) => err,
            ClientError::Codec(err) => err.protocol_error()?,
            _ => return None,
        };
        match protocol {
            ProtocolError::Io(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
