use std::fmt;
use std::io;

use dynthrift::client::ClientError;
use dynthrift::protocol::ProtocolError;
use dynthrift::value::{CodecError, ErrorKind};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(&err), format!("{context}: {err}"))
}

pub fn protocol_error(context: &str, err: ProtocolError) -> CliError {
    CliError::new(protocol_code(&err), format!("{context}: {err}"))
}

pub fn codec_error(context: &str, err: CodecError) -> CliError {
    CliError::new(codec_code(&err), format!("{context}: {err}"))
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    let code = if err.is_timeout() {
        TIMEOUT
    } else {
        match &err {
            ClientError::Application(_) => FAILURE,
            ClientError::Connect { .. } => TRANSPORT_ERROR,
            ClientError::Io(source) => io_code(source),
            ClientError::Protocol(inner) => protocol_code(inner),
            ClientError::Codec(inner) => codec_code(inner),
            ClientError::UnexpectedMessageType(_)
            | ClientError::WrongMethodName { .. }
            | ClientError::BadSequenceId { .. } => DATA_INVALID,
        }
    };
    CliError::new(code, format!("{context}: {err}"))
}

fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected => TRANSPORT_ERROR,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    }
}

fn protocol_code(err: &ProtocolError) -> i32 {
    match err {
        ProtocolError::Io(source) => io_code(source),
        ProtocolError::ConnectionClosed => TRANSPORT_ERROR,
        _ => DATA_INVALID,
    }
}

fn codec_code(err: &CodecError) -> i32 {
    match (err.kind(), err.protocol_error()) {
        (ErrorKind::Unsupported, _) => USAGE,
        (_, Some(inner)) => protocol_code(inner),
        (_, None) => DATA_INVALID,
    }
}
