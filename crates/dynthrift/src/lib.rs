//! Build, send and inspect Thrift payloads at runtime.
//!
//! dynthrift models every wire value as one of a small closed set of dynamic
//! variants, so calls can be made against unmodified Thrift servers without
//! generated types.
//!
//! # Crate Structure
//!
//! - [`protocol`]: Binary protocol reader/writer, generic skip, framed transport
//! - [`value`]: Dynamic values, their codec, and the request/response envelopes
//! - [`client`]: Blocking call client over TCP (behind `client` feature)

/// Re-export protocol types.
pub mod protocol {
    pub use dynthrift_protocol::*;
}

/// Re-export value types.
pub mod value {
    pub use dynthrift_value::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use dynthrift_client::*;
}
