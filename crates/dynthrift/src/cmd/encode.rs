use std::fs;

use dynthrift::client::{ClientConfig, WriteHalf};
use dynthrift::protocol::{BinaryProtocolWriter, MessageType, ProtocolWriter};
use dynthrift::value::Request;

use crate::cmd::{load_args, EncodeArgs};
use crate::exit::{codec_error, io_error, protocol_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

/// Sequence id written when the arguments are wrapped in a CALL message.
const ENCODE_SEQ_ID: i32 = 1;

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let request = load_args(args.args.as_deref(), args.file.as_deref())?;
    let bytes = encode(&request, args.method.as_deref(), args.framed)?;
    tracing::debug!(
        args = request.len(),
        size = bytes.len(),
        framed = args.framed,
        "encoded request"
    );

    match &args.out {
        Some(path) => {
            fs::write(path, &bytes)
                .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
            print_encoded(&bytes, Some(&path.display().to_string()), format);
        }
        None => print_encoded(&bytes, None, format),
    }

    Ok(SUCCESS)
}

fn encode(request: &Request, method: Option<&str>, framed: bool) -> CliResult<Vec<u8>> {
    let config = ClientConfig {
        framed,
        ..ClientConfig::default()
    };
    let sink = WriteHalf::new(Vec::new(), &config);
    let mut writer = BinaryProtocolWriter::with_config(sink, config.protocol);

    if let Some(method) = method {
        writer
            .write_message_begin(method, MessageType::Call, ENCODE_SEQ_ID)
            .map_err(|err| protocol_error("write message header", err))?;
    }
    request
        .write(&mut writer)
        .map_err(|err| codec_error("encode failed", err))?;
    if method.is_some() {
        writer
            .write_message_end()
            .map_err(|err| protocol_error("write message end", err))?;
    }

    let sink = writer
        .finish()
        .map_err(|err| protocol_error("flush failed", err))?;
    Ok(match sink {
        WriteHalf::Buffered(buf) => buf,
        WriteHalf::Framed(writer) => writer.into_inner(),
    })
}
