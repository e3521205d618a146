//! Fixed-width little-endian unsigned integers.
//!
//! A scalar of width `w` always occupies exactly `w` bytes, least-significant
//! first: `byte[i] = (value >> (8 * i)) & 0xFF`. The size never depends on the
//! value, which is the trade against varints: predictable layout instead of
//! fewer bytes for small numbers.

use crate::types::encoding::EncodeSink;
use crate::types::error::{DecodeError, EncodeError, Malformed};
use crate::types::reader::Reader;
use crate::types::strategy::Scalar;

/// Writes the low `T::WIDTH` bytes of `value`, returning `T::WIDTH`.
pub fn write<T: Scalar, W: EncodeSink>(value: T, out: &mut W) -> Result<usize, EncodeError> {
    let bytes = value.to_u64().to_le_bytes();
    out.write(&bytes[..T::WIDTH])?;
    Ok(T::WIDTH)
}

/// Reads exactly `T::WIDTH` bytes and reassembles them into a `T`.
pub fn read<T: Scalar>(input: &mut Reader<'_>) -> Result<T, DecodeError> {
    let bytes = input.take(T::WIDTH)?;
    let value = bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte));
    T::from_u64(value).ok_or(DecodeError::MalformedInput(Malformed::ScalarOverflow {
        value,
        width: T::WIDTH,
    }))
}
