use dynthrift_protocol::{MessageType, ProtocolReader, ProtocolWriter};
use dynthrift_value::{Request, Response};

use crate::error::{ClientError, Result};
use crate::exception::ApplicationException;

/// A blocking dynamic call client over a protocol reader/writer pair.
///
/// Calls are strictly sequential; each one owns the stream until its reply
/// has been read.
pub struct Client<I, O> {
    input: I,
    output: O,
    seq_id: i32,
}

impl<I: ProtocolReader, O: ProtocolWriter> Client<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self {
            input,
            output,
            seq_id: 0,
        }
    }

    /// Sequence id of the most recent call (0 before the first).
    pub fn seq_id(&self) -> i32 {
        self.seq_id
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn into_inner(self) -> (I, O) {
        (self.input, self.output)
    }

    /// Call `method` and wait for its reply.
    pub fn call(&mut self, method: &str, request: &Request) -> Result<Response> {
        let seq_id = self.next_seq_id();
        tracing::debug!(method, seq_id, args = request.len(), "sending call");
        self.send(method, MessageType::Call, seq_id, request)?;
        self.recv(method, seq_id)
    }

    /// Send `method` as a one-way message. No reply is read.
    pub fn call_oneway(&mut self, method: &str, request: &Request) -> Result<()> {
        let seq_id = self.next_seq_id();
        tracing::debug!(method, seq_id, "sending oneway");
        self.send(method, MessageType::Oneway, seq_id, request)
    }

    /// Like [`call`](Self::call), but reports failure inside the result and
    /// logs it instead of returning `Err`.
    pub fn invoke(&mut self, method: &str, request: &Request) -> CallResult {
        match self.call(method, request) {
            Ok(response) => CallResult::success(response),
            Err(err) => {
                tracing::error!(method, error = %err, "call failed");
                CallResult::failure(err)
            }
        }
    }

    fn next_seq_id(&mut self) -> i32 {
        self.seq_id = self.seq_id.wrapping_add(1);
        self.seq_id
    }

    fn send(
        &mut self,
        method: &str,
        kind: MessageType,
        seq_id: i32,
        request: &Request,
    ) -> Result<()> {
        self.output.write_message_begin(method, kind, seq_id)?;
        request.write(&mut self.output)?;
        self.output.write_message_end()?;
        self.output.flush()?;
        Ok(())
    }

    fn recv(&mut self, method: &str, seq_id: i32) -> Result<Response> {
        let header = self.input.read_message_begin()?;
        if header.name != method {
            return Err(ClientError::WrongMethodName {
                expected: method.to_string(),
                actual: header.name,
            });
        }
        if header.seq_id != seq_id {
            return Err(ClientError::BadSequenceId {
                expected: seq_id,
                actual: header.seq_id,
            });
        }

        match header.kind {
            MessageType::Reply => {}
            MessageType::Exception => {
                let exception = ApplicationException::read(&mut self.input)?;
                self.input.read_message_end()?;
                tracing::debug!(method, seq_id, %exception, "server raised exception");
                return Err(ClientError::Application(exception));
            }
            other => return Err(ClientError::UnexpectedMessageType(other)),
        }

        let response = Response::read(&mut self.input)?;
        self.input.read_message_end()?;
        tracing::debug!(method, seq_id, fields = response.len(), "received reply");
        Ok(response)
    }
}

/// Outcome of [`Client::invoke`]: a response body or the error that
/// prevented one.
#[derive(Debug)]
pub struct CallResult {
    outcome: std::result::Result<Response, ClientError>,
}

impl CallResult {
    pub fn success(response: Response) -> Self {
        Self {
            outcome: Ok(response),
        }
    }

    pub fn failure(error: ClientError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn response(&self) -> Option<&Response> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<Response> {
        self.outcome
    }
}

impl From<Result<Response>> for CallResult {
    fn from(outcome: Result<Response>) -> Self {
        Self { outcome }
    }
}
