//! Message buffer for the game's length-prefixed binary protocol.
//!
//! Every field sent or received by the client and server goes through a
//! [`MessageBuffer`]: integers, strings, map positions and fixed-point
//! doubles, all little-endian inside a `[u16 length][payload]` frame.

pub mod buffer;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod header;
pub mod scalar;

pub use buffer::{
    DEFAULT_DOUBLE_PRECISION, DOUBLE_OFFSET, MessageBuffer, PADDING_BYTE, POSITION_SIZE,
};
pub use common::Position;
pub use config::{BufferLimits, ConfigError, NETWORKMESSAGE_MAXSIZE};
pub use diagnostics::CallSite;
pub use error::BufferError;
pub use header::{HEADER_LENGTH, INITIAL_BUFFER_POSITION};
pub use scalar::Scalar;

/// Returns the crate version string.
pub fn protocol_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
