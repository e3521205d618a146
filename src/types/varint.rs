//! LEB128-style variable-length unsigned integers.
//!
//! Each byte carries 7 payload bits, least-significant group first. The high
//! bit (`0x80`) is set on every byte except the last.
//!
//! ```text
//! 0       -> 00
//! 127     -> 7f
//! 128     -> 80 01
//! 300     -> ac 02
//! u64::MAX -> ff ff ff ff ff ff ff ff ff 01
//! ```
//!
//! Encodings are minimal: the encoder never emits a redundant trailing zero
//! group, and the decoder rejects one. Each value therefore has exactly one
//! encoding.

use crate::types::encoding::EncodeSink;
use crate::types::error::{DecodeError, EncodeError, Malformed};
use crate::types::reader::Reader;

/// Longest encoding of a `u64`.
pub const MAX_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7F;

/// Number of bytes `value` encodes to (minimum 1).
pub const fn size_of(value: u64) -> usize {
    let mut len = 1;
    let mut rest = value;
    while rest >= CONTINUATION as u64 {
        rest >>= 7;
        len += 1;
    }
    len
}

/// Encodes `value` into a stack buffer, returning the buffer and the used length.
pub fn encode_array(value: u64) -> ([u8; MAX_LEN], usize) {
    let mut buf = [0u8; MAX_LEN];
    let mut rest = value;
    let mut len = 0;
    while rest >= CONTINUATION as u64 {
        buf[len] = (rest as u8 & PAYLOAD) | CONTINUATION;
        rest >>= 7;
        len += 1;
    }
    buf[len] = rest as u8;
    (buf, len + 1)
}

/// Writes `value` to the sink, returning the number of bytes written.
pub fn write<W: EncodeSink>(value: u64, out: &mut W) -> Result<usize, EncodeError> {
    let (buf, len) = encode_array(value);
    out.write(&buf[..len])?;
    Ok(len)
}

/// Decodes one varint from the start of `buf`, returning the value and bytes consumed.
///
/// # Errors
///
/// - [`DecodeError::TruncatedInput`] if `buf` ends before a byte with the
///   continuation bit clear.
/// - [`Malformed::VarintOverflow`] if the value needs more than 64 bits.
/// - [`Malformed::NonCanonicalVarint`] if the final group is a redundant zero.
///
/// The last rule is stricter than plain LEB128, where `[0x80, 0x00]` reads as
/// 0. Only the minimal form is accepted so every value has a single encoding
/// and re-encoding a decoded record reproduces its input bytes.
pub fn decode(buf: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut value = 0u64;
    let mut shift = 0u32;

    for (i, &byte) in buf.iter().enumerate() {
        let group = u64::from(byte & PAYLOAD);
        // The tenth byte only has room for bit 63.
        if shift == 63 && group > 1 {
            return Err(Malformed::VarintOverflow.into());
        }
        value |= group << shift;

        if byte & CONTINUATION == 0 {
            if byte == 0 && i > 0 {
                return Err(Malformed::NonCanonicalVarint.into());
            }
            return Ok((value, i + 1));
        }

        shift += 7;
        if shift > 63 {
            return Err(Malformed::VarintOverflow.into());
        }
    }

    Err(DecodeError::TruncatedInput {
        needed: buf.len() + 1,
        remaining: buf.len(),
    })
}

/// Reads one varint from the reader, advancing past it.
pub fn read(input: &mut Reader<'_>) -> Result<u64, DecodeError> {
    let (value, len) = decode(input.rest())?;
    input.advance(len)?;
    Ok(value)
}
