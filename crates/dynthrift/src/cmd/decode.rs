use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use dynthrift::client::ApplicationException;
use dynthrift::protocol::{
    BinaryProtocolReader, FramedReader, MessageHeader, MessageType, ProtocolReader,
};
use dynthrift::value::Response;

use crate::cmd::DecodeArgs;
use crate::exit::{
    codec_error, io_error, protocol_error, CliError, CliResult, DATA_INVALID, FAILURE, SUCCESS,
};
use crate::output::{print_response, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(&args.input)?;
    let payload = if args.framed { unframe(input)? } else { input };

    let (header, response) = decode(&payload, args.message)?;
    print_response(header.as_ref(), &response, format);
    Ok(SUCCESS)
}

fn read_input(path: &Path) -> CliResult<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(buf);
    }
    fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}

fn unframe(input: Vec<u8>) -> CliResult<Vec<u8>> {
    let mut reader = FramedReader::new(Cursor::new(input));
    match reader
        .read_frame()
        .map_err(|err| protocol_error("read frame", err))?
    {
        Some(frame) => Ok(frame.to_vec()),
        None => Err(CliError::new(DATA_INVALID, "input holds no frame")),
    }
}

fn decode(payload: &[u8], message: bool) -> CliResult<(Option<MessageHeader>, Response)> {
    let mut reader = BinaryProtocolReader::new(Cursor::new(payload));

    let header = if message {
        let header = reader
            .read_message_begin()
            .map_err(|err| protocol_error("read message header", err))?;
        if header.kind == MessageType::Exception {
            let exception = ApplicationException::read(&mut reader)
                .map_err(|err| codec_error("decode exception", err))?;
            return Err(CliError::new(
                FAILURE,
                format!("{} raised: {exception}", header.name),
            ));
        }
        Some(header)
    } else {
        None
    };

    let response = Response::read(&mut reader).map_err(|err| codec_error("decode failed", err))?;
    if message {
        reader
            .read_message_end()
            .map_err(|err| protocol_error("read message end", err))?;
    }

    let consumed = reader.get_ref().position() as usize;
    if consumed < payload.len() {
        tracing::warn!(trailing = payload.len() - consumed, "ignoring trailing bytes");
    }
    Ok((header, response))
}
