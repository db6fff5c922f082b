/// Default maximum string/binary payload size: 16 MiB.
pub const DEFAULT_MAX_STRING_SIZE: usize = 16 * 1024 * 1024;

/// Default maximum number of list/set/map entries.
pub const DEFAULT_MAX_CONTAINER_SIZE: usize = 1024 * 1024;

/// Default maximum container nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum frame size for the framed transport.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16_384_000;

/// Limits and strictness settings for the binary protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Maximum string/binary length accepted on read.
    pub max_string_size: usize,
    /// Maximum list/set/map element count accepted on read.
    pub max_container_size: usize,
    /// Maximum nesting of structs, lists, sets and maps on read.
    pub max_depth: usize,
    /// Reject message headers without a version word.
    pub strict_read: bool,
    /// Emit versioned message headers.
    pub strict_write: bool,
    /// Maximum frame size for [`crate::FramedReader`] / [`crate::FramedWriter`].
    pub max_frame_size: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_string_size: DEFAULT_MAX_STRING_SIZE,
            max_container_size: DEFAULT_MAX_CONTAINER_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_read: false,
            strict_write: true,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
