use clap::{Args, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use dynthrift::value::Request;

use crate::exit::{io_error, CliResult};
use crate::notation::parse_args;
use crate::output::OutputFormat;

pub mod call;
pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode call arguments with the binary protocol.
    Encode(EncodeArgs),
    /// Decode a binary protocol result struct.
    Decode(DecodeArgs),
    /// Call a method on a Thrift server and print the result.
    Call(CallArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Call(args) => call::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Arguments as typed JSON, e.g. '{"1":{"string":"ID"}}'.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub args: Option<String>,
    /// Read the arguments JSON from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    /// Wrap the arguments in a CALL message for this method.
    #[arg(long)]
    pub method: Option<String>,
    /// Prefix the output with a 4-byte frame length.
    #[arg(long)]
    pub framed: bool,
    /// Write the encoded bytes to a file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file, or '-' for stdin.
    pub input: PathBuf,
    /// Input starts with a message header.
    #[arg(long)]
    pub message: bool,
    /// Input is a length-prefixed frame.
    #[arg(long)]
    pub framed: bool,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Server address (HOST:PORT).
    pub addr: String,
    /// Method name.
    pub method: String,
    /// Arguments as typed JSON. Default: no arguments.
    #[arg(long, conflicts_with = "file")]
    pub args: Option<String>,
    /// Read the arguments JSON from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    /// Use the framed transport.
    #[arg(long)]
    pub framed: bool,
    /// Send as a one-way message and do not wait for a reply.
    #[arg(long)]
    pub oneway: bool,
    /// Connect, read and write timeout (e.g. 500ms, 5s, 1m).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Load call arguments from `--args` or `--file`. Neither means no arguments.
pub fn load_args(inline: Option<&str>, file: Option<&Path>) -> CliResult<Request> {
    if let Some(json) = inline {
        return parse_args(json);
    }
    if let Some(path) = file {
        let json = fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return parse_args(&json);
    }
    Ok(Request::new())
}
