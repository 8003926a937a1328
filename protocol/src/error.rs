//! Errors reported by [`MessageBuffer`](crate::MessageBuffer) operations.

/// Why a read or write against a message buffer was rejected.
///
/// The lenient accessors log these and fall back to a zero value; the `try_`
/// accessors hand them back to the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("read underflow: requested {requested} bytes, {available} available")]
    ReadUnderflow { requested: usize, available: usize },

    #[error("write overflow: requested {requested} bytes, {available} available")]
    WriteOverflow { requested: usize, available: usize },

    #[error("{field} too large: size={size} limit={limit}")]
    FieldTooLarge {
        field: &'static str,
        size: usize,
        limit: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, BufferError>;
