//! Dynamic Thrift calls over an open stream.
//!
//! [`Client`] wraps a protocol reader/writer pair and performs one call at a
//! time: it writes a CALL message carrying a [`Request`](dynthrift_value::Request),
//! validates the reply header the way a standard Thrift client does, and
//! decodes the result as a [`Response`](dynthrift_value::Response).
//!
//! [`connect`] opens a TCP connection with either the buffered or the
//! framed transport.

pub mod client;
pub mod connector;
pub mod error;
pub mod exception;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::{CallResult, Client};
pub use connector::{
    connect, from_halves, ClientConfig, ReadHalf, StreamClient, TcpClient, WriteHalf,
    DEFAULT_TIMEOUT,
};
pub use error::{ClientError, Result};
pub use exception::{ApplicationException, ExceptionKind};
