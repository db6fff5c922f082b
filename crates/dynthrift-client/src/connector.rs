use std::io::{BufReader, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use dynthrift_protocol::{
    BinaryProtocolReader, BinaryProtocolWriter, FramedReader, FramedWriter, ProtocolConfig,
};

use crate::client::Client;
use crate::error::{ClientError, Result};

/// Default connect, read and write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Limits for the binary protocol on both directions.
    pub protocol: ProtocolConfig,
    /// Use the 4-byte length-prefixed framed transport.
    pub framed: bool,
    /// Connect, read and write timeout. `None` blocks indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolConfig::default(),
            framed: false,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

/// Input side of a connection, buffered or framed.
pub enum ReadHalf<S> {
    Buffered(BufReader<S>),
    Framed(FramedReader<S>),
}

impl<S: Read> ReadHalf<S> {
    pub fn new(stream: S, config: &ClientConfig) -> Self {
        if config.framed {
            ReadHalf::Framed(FramedReader::with_max_frame_size(
                stream,
                config.protocol.max_frame_size,
            ))
        } else {
            ReadHalf::Buffered(BufReader::new(stream))
        }
    }
}

impl<S: Read> Read for ReadHalf<S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            ReadHalf::Buffered(reader) => reader.read(buf),
            ReadHalf::Framed(reader) => reader.read(buf),
        }
    }
}

/// Output side of a connection, plain or framed.
///
/// The protocol writer already buffers a whole message, so the plain variant
/// writes straight to the stream.
pub enum WriteHalf<S> {
    Buffered(S),
    Framed(FramedWriter<S>),
}

impl<S: Write> WriteHalf<S> {
    pub fn new(stream: S, config: &ClientConfig) -> Self {
        if config.framed {
            WriteHalf::Framed(FramedWriter::with_max_frame_size(
                stream,
                config.protocol.max_frame_size,
            ))
        } else {
            WriteHalf::Buffered(stream)
        }
    }
}

impl<S: Write> Write for WriteHalf<S> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            WriteHalf::Buffered(writer) => writer.write(buf),
            WriteHalf::Framed(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            WriteHalf::Buffered(writer) => writer.flush(),
            WriteHalf::Framed(writer) => writer.flush(),
        }
    }
}

/// A binary protocol client over one stream split into two handles.
pub type StreamClient<S> =
    Client<BinaryProtocolReader<ReadHalf<S>>, BinaryProtocolWriter<WriteHalf<S>>>;

/// Client returned by [`connect`].
pub type TcpClient = StreamClient<TcpStream>;

/// Build a binary protocol client from the two handles of an open stream.
pub fn from_halves<S: Read + Write>(
    reader: S,
    writer: S,
    config: &ClientConfig,
) -> StreamClient<S> {
    Client::new(
        BinaryProtocolReader::with_config(ReadHalf::new(reader, config), config.protocol),
        BinaryProtocolWriter::with_config(WriteHalf::new(writer, config), config.protocol),
    )
}

/// Connect to a Thrift server at `addr` (`host:port`).
pub fn connect(addr: &str, config: &ClientConfig) -> Result<TcpClient> {
    let stream = open(addr, config.timeout)?;
    stream.set_read_timeout(config.timeout)?;
    stream.set_write_timeout(config.timeout)?;
    stream.set_nodelay(true)?;
    let reader = stream.try_clone()?;

    tracing::debug!(addr, framed = config.framed, "connected");
    Ok(from_halves(reader, stream, config))
}

fn open(addr: &str, timeout: Option<Duration>) -> Result<TcpStream> {
    let connect_err = |source: std::io::Error| ClientError::Connect {
        addr: addr.to_string(),
        source,
    };

    let mut last_err = None;
    for socket_addr in addr.to_socket_addrs().map_err(connect_err)? {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&socket_addr, timeout),
            None => TcpStream::connect(socket_addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                tracing::debug!(%socket_addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(connect_err(last_err.unwrap_or_else(|| {
        std::io::Error::new(ErrorKind::NotFound, "address resolved to nothing")
    })))
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use dynthrift_value::{Request, Value};

    use super::*;
    use crate::test_server::{self, Behaviour};

    fn serve_once(framed: bool) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let addr = listener.local_addr().expect("listener should have an address");

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("listener should accept");
            let reader = stream.try_clone().expect("stream should clone");
            test_server::spawn(reader, stream, framed, Behaviour::Normal, 1)
                .join()
                .expect("server thread should complete");
        });
        (addr.to_string(), server)
    }

    #[test]
    fn connect_and_call() {
        for framed in [false, true] {
            let (addr, server) = serve_once(framed);
            let config = ClientConfig {
                framed,
                ..ClientConfig::default()
            };

            let mut client = connect(&addr, &config).expect("client should connect");
            let response = client
                .call("simpleCall", &Request::from_values([(1, Value::from("tcp"))]))
                .expect("call should succeed");
            assert_eq!(response.get(0), Some(&Value::from("Success: tcp")));

            server.join().expect("server thread should complete");
        }
    }

    #[test]
    fn connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let addr = listener.local_addr().expect("listener should have an address");
        drop(listener);

        let err = match connect(&addr.to_string(), &ClientConfig::default()) {
            Ok(_) => panic!("connect should fail"),
            Err(err) => err,
        };
        assert!(matches!(err, ClientError::Connect { .. }));
        assert!(err.is_transport());
    }

    #[test]
    fn unresolvable_address() {
        let err = match connect("not-an-address", &ClientConfig::default()) {
            Ok(_) => panic!("connect should fail"),
            Err(err) => err,
        };
        assert!(matches!(err, ClientError::Connect { .. }));
    }

    #[test]
    fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let addr = listener.local_addr().expect("listener should have an address");
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("listener should accept");
            let mut sink = Vec::new();
            let _ = stream.read_to_end(&mut sink);
        });

        let config = ClientConfig {
            timeout: Some(Duration::from_millis(100)),
            ..ClientConfig::default()
        };
        let mut client = connect(&addr.to_string(), &config).expect("client should connect");
        let err = client
            .call("simpleCall", &Request::from_values([(1, Value::from("slow"))]))
            .expect_err("call should time out");
        assert!(err.is_timeout(), "unexpected error: {err}");

        drop(client);
        server.join().expect("server thread should complete");
    }

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert!(!config.framed);
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert_eq!(config.protocol, ProtocolConfig::default());
    }
}
