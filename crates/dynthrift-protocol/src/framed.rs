use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config::DEFAULT_MAX_FRAME_SIZE;
use crate::error::{ProtocolError, Result};

/// Frame header: a 4-byte big-endian payload length.
pub const FRAME_HEADER_SIZE: usize = 4;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Encode one frame of the Thrift framed transport.
///
/// ```text
/// ┌──────────────┬─────────────────┐
/// │ Length (4B)  │ Payload         │
/// │ big-endian   │ (Length bytes)  │
/// └──────────────┴─────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > i32::MAX as usize {
        return Err(ProtocolError::FrameTooLarge {
            size: payload.len(),
            max: i32::MAX as usize,
        });
    }
    dst.reserve(FRAME_HEADER_SIZE + payload.len());
    dst.put_i32(payload.len() as i32);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_frame_size: usize) -> Result<Option<Bytes>> {
    if src.len() < FRAME_HEADER_SIZE {
        return Ok(None);
    }

    let len = i32::from_be_bytes([src[0], src[1], src[2], src[3]]);
    if len < 0 {
        return Err(ProtocolError::NegativeSize {
            what: "frame",
            size: len,
        });
    }
    let len = len as usize;
    if len > max_frame_size {
        return Err(ProtocolError::FrameTooLarge {
            size: len,
            max: max_frame_size,
        });
    }

    if src.len() < FRAME_HEADER_SIZE + len {
        return Ok(None);
    }

    src.advance(FRAME_HEADER_SIZE);
    Ok(Some(src.split_to(len).freeze()))
}

/// `Write` adapter that turns each flush into one length-prefixed frame.
pub struct FramedWriter<W> {
    inner: W,
    pending: BytesMut,
    wire: BytesMut,
    max_frame_size: usize,
    // Set once a frame was cut short on the stream; nothing after it can be parsed.
    broken: bool,
}

impl<W: Write> FramedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_max_frame_size(inner, DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(inner: W, max_frame_size: usize) -> Self {
        Self {
            inner,
            pending: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            wire: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_frame_size,
            broken: false,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consume the writer and return the inner stream. Unflushed bytes are dropped.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn send_frame(&mut self) -> std::io::Result<()> {
        if self.pending.len() > self.max_frame_size {
            let err = ProtocolError::FrameTooLarge {
                size: self.pending.len(),
                max: self.max_frame_size,
            };
            self.pending.clear();
            return Err(std::io::Error::new(ErrorKind::InvalidInput, err));
        }

        self.wire.clear();
        encode_frame(&self.pending, &mut self.wire)
            .map_err(|err| std::io::Error::new(ErrorKind::InvalidInput, err))?;
        self.pending.clear();
        if let Err(err) = self.inner.write_all(&self.wire) {
            self.broken = true;
            return Err(err);
        }
        Ok(())
    }

    fn check_broken(&self) -> std::io::Result<()> {
        if self.broken {
            return Err(std::io::Error::new(
                ErrorKind::BrokenPipe,
                "an earlier frame was only partially written",
            ));
        }
        Ok(())
    }
}

impl<W: Write> Write for FramedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.check_broken()?;
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.check_broken()?;
        if !self.pending.is_empty() {
            self.send_frame()?;
        }
        self.inner.flush()
    }
}

/// `Read` adapter that serves the payload of one frame at a time.
pub struct FramedReader<R> {
    inner: R,
    buf: BytesMut,
    frame: Bytes,
    max_frame_size: usize,
}

impl<R: Read> FramedReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_frame_size(inner, DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(inner: R, max_frame_size: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            frame: Bytes::new(),
            max_frame_size,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the next complete frame (blocking). `Ok(None)` on clean EOF.
    pub fn read_frame(&mut self) -> Result<Option<Bytes>> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf, self.max_frame_size)? {
                return Ok(Some(frame));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtocolError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(ProtocolError::UnexpectedEof);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }
}

impl<R: Read> Read for FramedReader<R> {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        while self.frame.is_empty() {
            match self.read_frame() {
                Ok(Some(frame)) => self.frame = frame,
                Ok(None) => return Ok(0),
                Err(ProtocolError::Io(err)) => return Err(err),
                Err(ProtocolError::UnexpectedEof) => {
                    return Err(std::io::Error::from(ErrorKind::UnexpectedEof))
                }
                Err(err) => return Err(std::io::Error::new(ErrorKind::InvalidData, err)),
            }
        }

        let n = out.len().min(self.frame.len());
        out[..n].copy_from_slice(&self.frame[..n]);
        self.frame.advance(n);
        Ok(n)
    }
}
