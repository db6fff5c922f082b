#![cfg(feature = "cli")]

use std::io::{BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread;

use dynthrift::protocol::{
    BinaryProtocolReader, BinaryProtocolWriter, MessageType, ProtocolReader, ProtocolWriter,
};
use dynthrift::value::container::write_struct;
use dynthrift::value::{Response, StructValue, Value};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "dynthrift-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn dynthrift(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dynthrift"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("dynthrift should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Answer one call the way the echo test service does.
fn spawn_echo_server() -> (String, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener
        .local_addr()
        .expect("listener should have an address")
        .to_string();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("listener should accept");
        let input = stream.try_clone().expect("stream should clone");
        let mut reader = BinaryProtocolReader::new(BufReader::new(input));
        let mut writer = BinaryProtocolWriter::new(stream);

        let header = reader
            .read_message_begin()
            .expect("call header should decode");
        let args = Response::read(&mut reader).expect("call arguments should decode");
        reader.read_message_end().expect("call should end");

        let id = args.get(1).and_then(Value::as_str).unwrap_or_default();
        let result =
            StructValue::new().with_field(0, "success", Value::String(format!("Success: {id}")));
        writer
            .write_message_begin(&header.name, MessageType::Reply, header.seq_id)
            .expect("reply header should encode");
        write_struct(&mut writer, &result).expect("reply should encode");
        writer.write_message_end().expect("reply should end");
        writer.flush().expect("reply should flush");
    });
    (addr, handle)
}

#[test]
fn version_prints_package_version() {
    let output = dynthrift(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("dynthrift {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn encode_prints_hex_json() {
    let output = dynthrift(&["--format", "json", "encode", "--args", r#"{"1":{"string":"ID"}}"#]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        r#"{"size":10,"hex":"0b000100000002494400"}"#
    );
}

#[test]
fn encode_raw_writes_bytes_to_stdout() {
    let output = dynthrift(&["--format", "raw", "encode", "--args", r#"{"1":{"bool":true}}"#]);
    assert!(output.status.success());
    assert_eq!(output.stdout, vec![2, 0, 1, 1, 0]);
}

#[test]
fn encode_then_decode_framed_call() {
    let dir = unique_temp_dir("roundtrip");
    let args_path = dir.join("args.json");
    let out_path = dir.join("call.bin");
    std::fs::write(
        &args_path,
        r#"{"1":{"map":{"key":"string","value":"bool","entries":[[{"string":"key 1"},{"bool":true}],[{"string":"key 2"},{"bool":false}]]}}}"#,
    )
    .expect("args file should be writable");

    let encoded = dynthrift(&[
        "--format",
        "json",
        "encode",
        "--file",
        args_path.to_str().expect("path should be UTF-8"),
        "--method",
        "mapCall",
        "--framed",
        "--out",
        out_path.to_str().expect("path should be UTF-8"),
    ]);
    assert!(encoded.status.success());
    assert!(stdout(&encoded).contains("call.bin"));

    let decoded = dynthrift(&[
        "--format",
        "json",
        "decode",
        out_path.to_str().expect("path should be UTF-8"),
        "--message",
        "--framed",
    ]);
    assert!(decoded.status.success());
    let text = stdout(&decoded);
    assert!(text.contains(r#""method":"mapCall""#));
    assert!(text.contains(r#""kind":"call""#));
    assert!(text.contains(r#"[{"string":"key 1"},{"bool":true}],[{"string":"key 2"},{"bool":false}]"#));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_dynthrift"))
        .args(["--log-level", "error", "--format", "json", "decode", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("decode should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(&[0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x07, 0x00])
        .expect("stdin should accept input");

    let output = child.wait_with_output().expect("decode should finish");
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), r#"{"values":{"0":{"enum":7}}}"#);
}

#[test]
fn decode_garbage_returns_60() {
    let dir = unique_temp_dir("garbage");
    let path = dir.join("garbage.bin");
    std::fs::write(&path, b"abc").expect("input should be writable");

    let output = dynthrift(&["decode", path.to_str().expect("path should be UTF-8")]);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn invalid_args_return_64() {
    let output = dynthrift(&["encode", "--args", r#"{"1":{"list":{"elem":"bool","values":[{"enum":1}]}}}"#]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("list element 0 is enum, declared bool"));
}

#[test]
fn call_against_echo_server() {
    let (addr, server) = spawn_echo_server();

    let output = dynthrift(&[
        "--format",
        "json",
        "call",
        &addr,
        "simpleCall",
        "--args",
        r#"{"1":{"string":"ID"}}"#,
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        r#"{"method":"simpleCall","kind":"reply","seq_id":1,"values":{"0":{"string":"Success: ID"}}}"#
    );

    server.join().expect("server thread should complete");
}

#[test]
fn call_refused_returns_3() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener
        .local_addr()
        .expect("listener should have an address")
        .to_string();
    drop(listener);

    let output = dynthrift(&["call", &addr, "simpleCall"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn call_timeout_returns_124() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener
        .local_addr()
        .expect("listener should have an address")
        .to_string();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("listener should accept");
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
    });

    let output = dynthrift(&["call", &addr, "simpleCall", "--timeout", "200ms"]);
    assert_eq!(output.status.code(), Some(124));

    server.join().expect("server thread should complete");
}
