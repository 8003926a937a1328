//! Frame header layout.
//!
//! Every frame on the wire is `[u16 length LE][payload]`. Outbound messages
//! reserve room in front of the payload for the transport, which may insert a
//! checksum and an encrypted length after the plain length prefix:
//!
//! ```text
//! 0      2          6                8
//! | size | checksum | encrypted size | payload ...
//! ```

/// Bytes taken by the plain little-endian length prefix.
pub const HEADER_LENGTH: usize = 2;

/// Bytes reserved for the transport checksum.
pub const CHECKSUM_LENGTH: usize = 4;

/// Bytes reserved for the length of the encrypted body.
pub const ENCRYPTED_LENGTH: usize = 2;

/// Offset of the first payload byte in a freshly constructed buffer.
pub const INITIAL_BUFFER_POSITION: usize = HEADER_LENGTH + CHECKSUM_LENGTH + ENCRYPTED_LENGTH;

/// Reads the length prefix from the first two bytes of `bytes`.
///
/// Returns `None` when fewer than [`HEADER_LENGTH`] bytes are available.
#[must_use]
pub fn decode_length(bytes: &[u8]) -> Option<u16> {
    match bytes {
        [lo, hi, ..] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}

/// Encodes `length` as a length prefix.
#[must_use]
pub const fn encode_length(length: u16) -> [u8; HEADER_LENGTH] {
    length.to_le_bytes()
}
