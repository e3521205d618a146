//! Scalar encoding strategies.
//!
//! A [`Strategy`] decides how every unsigned integer in a stream is written:
//! [`FixedWidth`] uses the field's declared byte width, [`Varint`] uses
//! LEB128. The record schema is shared; the strategy is picked per stream by
//! type parameter, and the two wire formats are not interchangeable.
//!
//! Collection counts go through the strategy as well. Both strategies encode
//! counts as varints, so an empty list always costs a single `00` byte.

use crate::types::encoding::EncodeSink;
use crate::types::error::{DecodeError, EncodeError, Malformed};
use crate::types::reader::Reader;
use crate::types::{fixed, varint};
use std::fmt::Debug;

/// Unsigned integer that can appear as a scalar field.
pub trait Scalar: Copy + Default + Eq + Debug {
    /// Declared width in bytes.
    const WIDTH: usize;

    fn to_u64(self) -> u64;

    /// Narrows `value`, or `None` if it does not fit in `WIDTH` bytes.
    fn from_u64(value: u64) -> Option<Self>;
}

macro_rules! impl_scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();

                fn to_u64(self) -> u64 {
                    self as u64
                }

                fn from_u64(value: u64) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_scalar!(u8, u16, u32, u64);

/// Capability set for encoding scalars and collection counts.
pub trait Strategy: Copy + Default + Debug + Send + Sync + 'static {
    /// Short name used in log lines.
    const NAME: &'static str;

    /// Encoded size of `value`.
    fn scalar_size<T: Scalar>(value: T) -> usize;

    /// Encoded size of any `T`, if it does not depend on the value.
    fn scalar_fixed_size<T: Scalar>() -> Option<usize>;

    /// Smallest possible encoded size of a `T`.
    fn scalar_min_size<T: Scalar>() -> usize;

    fn write_scalar<T: Scalar, W: EncodeSink>(value: T, out: &mut W)
    -> Result<usize, EncodeError>;

    fn read_scalar<T: Scalar>(input: &mut Reader<'_>) -> Result<T, DecodeError>;

    /// Encoded size of a collection count.
    fn len_size(len: usize) -> usize {
        varint::size_of(len as u64)
    }

    fn write_len<W: EncodeSink>(len: usize, out: &mut W) -> Result<usize, EncodeError> {
        varint::write(len as u64, out)
    }

    /// Reads a collection count and checks it against the reader's limits.
    fn read_len(input: &mut Reader<'_>) -> Result<usize, DecodeError> {
        let len = varint::read(input)?;
        let max = input.limits().max_collection_len;
        match usize::try_from(len) {
            Ok(n) if n <= max => Ok(n),
            _ => Err(DecodeError::LengthOverflow { len, max }),
        }
    }
}

/// Every scalar takes exactly its declared width, little-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedWidth;

impl Strategy for FixedWidth {
    const NAME: &'static str = "fixed-width";

    fn scalar_size<T: Scalar>(_value: T) -> usize {
        T::WIDTH
    }

    fn scalar_fixed_size<T: Scalar>() -> Option<usize> {
        Some(T::WIDTH)
    }

    fn scalar_min_size<T: Scalar>() -> usize {
        T::WIDTH
    }

    fn write_scalar<T: Scalar, W: EncodeSink>(
        value: T,
        out: &mut W,
    ) -> Result<usize, EncodeError> {
        fixed::write(value, out)
    }

    fn read_scalar<T: Scalar>(input: &mut Reader<'_>) -> Result<T, DecodeError> {
        fixed::read(input)
    }
}

/// Every scalar is a minimal LEB128 varint, whatever its declared width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Varint;

impl Strategy for Varint {
    const NAME: &'static str = "varint";

    fn scalar_size<T: Scalar>(value: T) -> usize {
        varint::size_of(value.to_u64())
    }

    fn scalar_fixed_size<T: Scalar>() -> Option<usize> {
        None
    }

    fn scalar_min_size<T: Scalar>() -> usize {
        1
    }

    fn write_scalar<T: Scalar, W: EncodeSink>(
        value: T,
        out: &mut W,
    ) -> Result<usize, EncodeError> {
        varint::write(value.to_u64(), out)
    }

    /// Rejects values wider than `T` rather than truncating them.
    fn read_scalar<T: Scalar>(input: &mut Reader<'_>) -> Result<T, DecodeError> {
        let value = varint::read(input)?;
        T::from_u64(value).ok_or(DecodeError::MalformedInput(Malformed::ScalarOverflow {
            value,
            width: T::WIDTH,
        }))
    }
}
