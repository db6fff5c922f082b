use std::time::Duration;

use dynthrift::client::{connect, ClientConfig};
use dynthrift::protocol::{MessageHeader, MessageType};

use crate::cmd::{load_args, CallArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_response, OutputFormat};

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let request = load_args(args.args.as_deref(), args.file.as_deref())?;
    let config = ClientConfig {
        framed: args.framed,
        timeout: Some(timeout),
        ..ClientConfig::default()
    };

    let mut client =
        connect(&args.addr, &config).map_err(|err| client_error("connect failed", err))?;

    if args.oneway {
        client
            .call_oneway(&args.method, &request)
            .map_err(|err| client_error("send failed", err))?;
        return Ok(SUCCESS);
    }

    let response = client
        .call(&args.method, &request)
        .map_err(|err| client_error("call failed", err))?;
    let header = MessageHeader::new(args.method, MessageType::Reply, client.seq_id());
    print_response(Some(&header), &response, format);

    Ok(SUCCESS)
}

/// Parse a call timeout: digits followed by `ms`, `s` or `m`. Bare digits are seconds.
fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);

    let value: u64 = digits.parse().map_err(|_| {
        CliError::new(
            USAGE,
            format!("timeout {input:?} does not start with a number"),
        )
    })?;
    let duration = match unit {
        "ms" => Duration::from_millis(value),
        "" | "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        other => {
            return Err(CliError::new(
                USAGE,
                format!("timeout unit {other:?} is not one of ms, s, m"),
            ))
        }
    };

    if duration.is_zero() {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }
    Ok(duration)
}
