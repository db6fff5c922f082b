use dynthrift_protocol::ProtocolError;

/// Errors that can occur while encoding or decoding dynamic values.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The underlying protocol failed to read or write.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A failure inside a nested operation, annotated with where it happened.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<CodecError>,
    },

    /// The envelope is write-only and cannot be decoded.
    #[error("{0} envelopes are write-only and cannot be read back")]
    ReadUnsupported(&'static str),
}

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O failure on the underlying stream.
    Transport,
    /// Malformed or truncated wire data, or a mismatched primitive read.
    Decode,
    /// The operation is not supported by this codec.
    Unsupported,
}

impl CodecError {
    /// Classify the root cause.
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            CodecError::Protocol(err) if err.is_transport() => ErrorKind::Transport,
            CodecError::ReadUnsupported(_) => ErrorKind::Unsupported,
            _ => ErrorKind::Decode,
        }
    }

    /// The protocol error at the bottom of the context chain, if any.
    pub fn protocol_error(&self) -> Option<&ProtocolError> {
        match self.root() {
            CodecError::Protocol(err) => Some(err),
            _ => None,
        }
    }

    fn root(&self) -> &CodecError {
        let mut current = self;
        while let CodecError::Context { source, .. } = current {
            current = source.as_ref();
        }
        current
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Attach operation context to a failing result.
pub(crate) trait ResultExt<T> {
    fn context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CodecError>,
{
    fn context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|err| CodecError::Context {
            context: f().into(),
            source: Box::new(err.into()),
        })
    }
}
