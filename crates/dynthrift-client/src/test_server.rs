//! In-process Thrift server for tests, modelled on the echo test service.

use std::io::{Read, Write};
use std::thread::{self, JoinHandle};

use dynthrift_protocol::{
    BinaryProtocolReader, BinaryProtocolWriter, MessageHeader, MessageType, ProtocolReader,
    ProtocolWriter,
};
use dynthrift_value::container::write_struct;
use dynthrift_value::{Response, StructValue, Value};

use crate::connector::{ClientConfig, ReadHalf, WriteHalf};
use crate::exception::{ApplicationException, ExceptionKind};

/// How the server answers, to exercise reply validation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Behaviour {
    Normal,
    WrongName,
    WrongSeqId,
    CallKind,
}

/// Serve `calls` messages on the given stream handles, then return the
/// headers that were received.
pub(crate) fn spawn<S>(
    reader: S,
    writer: S,
    framed: bool,
    behaviour: Behaviour,
    calls: usize,
) -> JoinHandle<Vec<MessageHeader>>
where
    S: Read + Write + Send + 'static,
{
    thread::spawn(move || {
        let config = ClientConfig {
            framed,
            ..ClientConfig::default()
        };
        let mut input = BinaryProtocolReader::new(ReadHalf::new(reader, &config));
        let mut output = BinaryProtocolWriter::new(WriteHalf::new(writer, &config));
        let mut seen = Vec::new();

        for _ in 0..calls {
            let header = input
                .read_message_begin()
                .expect("server should read call header");
            let args = Response::read(&mut input).expect("server should decode arguments");
            input.read_message_end().expect("server should finish call");
            seen.push(header.clone());
            if header.kind == MessageType::Oneway {
                continue;
            }

            let outcome = answer(&header.name, &args);
            let mut kind = if outcome.is_ok() {
                MessageType::Reply
            } else {
                MessageType::Exception
            };
            let mut name = header.name.clone();
            let mut seq_id = header.seq_id;
            match behaviour {
                Behaviour::Normal => {}
                Behaviour::WrongName => name = "otherCall".to_string(),
                Behaviour::WrongSeqId => seq_id += 1,
                Behaviour::CallKind => kind = MessageType::Call,
            }

            output
                .write_message_begin(&name, kind, seq_id)
                .expect("server should write reply header");
            match outcome {
                Ok(value) => {
                    let result = StructValue::new().with_field(0, "success", value);
                    write_struct(&mut output, &result).expect("server should write result");
                }
                Err(exception) => exception
                    .write(&mut output)
                    .expect("server should write exception"),
            }
            output.write_message_end().expect("server should end reply");
            output.flush().expect("server should flush reply");
        }
        seen
    })
}

fn answer(method: &str, args: &Response) -> Result<Value, ApplicationException> {
    match (method, args.get(1)) {
        ("simpleCall", Some(Value::String(id))) if id == "FAILURE" => Err(
            ApplicationException::new(ExceptionKind::InternalError, format!("Make failure: {id}")),
        ),
        ("simpleCall", Some(Value::String(id))) => Ok(Value::String(format!("Success: {id}"))),
        ("boolCall" | "mapCall" | "messageCall", Some(value)) => Ok(value.clone()),
        _ => Err(ApplicationException::new(
            ExceptionKind::UnknownMethod,
            format!("unknown method {method}"),
        )),
    }
}
