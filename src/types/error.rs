//! Error kinds surfaced by `marshal` and `unmarshal`.
//!
//! Nothing here is retried or recovered internally: every error goes straight
//! back to the caller, and a failed decode yields no partial record.

use ledger_codec_derive::Error;

/// Failure while writing an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The destination cannot hold the encoded record.
    ///
    /// Only reachable when a caller skips the size-then-marshal protocol and
    /// hands in a fixed slice that is shorter than `size`.
    #[error("buffer too small: need {needed} bytes, capacity is {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },
}

/// Failure while reading an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read required more bytes than remained in the buffer.
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },

    /// The bytes are present but do not describe a valid value.
    #[error("malformed input: {0}")]
    MalformedInput(Malformed),

    /// A collection count exceeds the configured limit.
    #[error("collection length {len} exceeds limit of {max}")]
    LengthOverflow { len: u64, max: usize },

    /// A strict decode finished with bytes left over.
    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
}

/// Reasons an encoding is rejected as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformed {
    /// A varint decoded to a value wider than its destination field.
    #[error("value {value} does not fit in a {width}-byte scalar")]
    ScalarOverflow { value: u64, width: usize },

    /// A varint carries more than 64 significant bits.
    #[error("varint exceeds 64 bits")]
    VarintOverflow,

    /// A varint ends with a redundant zero group.
    #[error("varint is not minimally encoded")]
    NonCanonicalVarint,
}

impl From<Malformed> for DecodeError {
    fn from(reason: Malformed) -> Self {
        DecodeError::MalformedInput(reason)
    }
}
