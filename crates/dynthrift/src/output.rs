use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use dynthrift::protocol::{MessageHeader, MessageType};
use dynthrift::value::Response;
use serde::Serialize;

use crate::notation::{response_notation, Notation};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ResponseOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seq_id: Option<i32>,
    values: std::collections::BTreeMap<i16, Notation>,
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    hex: String,
}

/// Print a decoded response, with its message header when there was one.
pub fn print_response(header: Option<&MessageHeader>, response: &Response, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ResponseOutput {
                method: header.map(|header| header.name.as_str()),
                kind: header.map(|header| kind_name(header.kind)),
                seq_id: header.map(|header| header.seq_id),
                values: response_notation(response),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            if let Some(header) = header {
                println!(
                    "{} {} (seq {})",
                    kind_name(header.kind),
                    header.name,
                    header.seq_id
                );
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "TYPE", "VALUE"]);
            for (id, value) in response.values() {
                table.add_row(vec![
                    id.to_string(),
                    value.type_name().to_string(),
                    value.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if let Some(header) = header {
                println!(
                    "method={} kind={} seq_id={}",
                    header.name,
                    kind_name(header.kind),
                    header.seq_id
                );
            }
            for (id, value) in response.values() {
                println!("{id} ({}) = {value}", value.type_name());
            }
        }
        OutputFormat::Raw => {
            for value in response.values().values() {
                println!("{value}");
            }
        }
    }
}

/// Print an encoded payload. `path` is set when the bytes already went to a file.
pub fn print_encoded(bytes: &[u8], path: Option<&str>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                size: bytes.len(),
                path,
                hex: hex(bytes),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SIZE", "PATH", "HEX"])
                .add_row(vec![
                    bytes.len().to_string(),
                    path.unwrap_or("-").to_string(),
                    hex(bytes),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("size={} path={}", bytes.len(), path.unwrap_or("-"));
            for (index, chunk) in bytes.chunks(16).enumerate() {
                println!("{:08x}  {}", index * 16, spaced_hex(chunk));
            }
        }
        OutputFormat::Raw => {
            if path.is_none() {
                print_raw(bytes);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn kind_name(kind: MessageType) -> &'static str {
    match kind {
        MessageType::Call => "call",
        MessageType::Reply => "reply",
        MessageType::Exception => "exception",
        MessageType::Oneway => "oneway",
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
