//! Field Layout Engine: schema-driven sizing, encoding and decoding.
//!
//! A record's schema is its ordered list of fields. Each field type knows its
//! own contribution through [`Encode`] and [`Decode`], and records compose
//! those contributions in declaration order (see `#[derive(BinaryCodec)]`).
//! Every operation is generic over a [`Strategy`], so the same schema produces
//! both the fixed-width and the varint wire format.
//!
//! # Binary Format
//!
//! - Scalars (`u8`, `u16`, `u32`, `u64`): written by the active strategy
//! - Fixed blobs `[u8; N]`: `N` raw bytes, no length prefix
//! - `Vec<T>`: a count prefix followed by each element in order
//! - Records: their fields concatenated, no tags or padding
//!
//! There is no magic number, version tag or checksum. Readers must know both
//! the schema and the strategy out of band.
//!
//! # Example
//!
//! ```ignore
//! use crate::types::encoding::{Decode, Encode};
//! use crate::types::strategy::Varint;
//!
//! let value: u64 = 300;
//! let mut out = Vec::with_capacity(value.size::<Varint>());
//! value.encode::<Varint, _>(&mut out)?;
//! assert_eq!(out, [0xAC, 0x02]);
//! ```

use crate::types::error::{DecodeError, EncodeError};
use crate::types::reader::Reader;
use crate::types::strategy::Strategy;

/// Destination for encoded bytes.
///
/// Implemented by growable buffers, fixed slices and hashers so a record can
/// be encoded straight into its final target.
pub trait EncodeSink {
    /// Appends `bytes`, or fails without writing anything if they do not fit.
    fn write(&mut self, bytes: &[u8]) -> Result<(), EncodeError>;
}

impl EncodeSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Sequential writer over a fixed, caller-owned slice.
///
/// Tracks a running cursor so fields never compute their own offsets, and
/// refuses any write that would pass the end of the slice.
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl EncodeSink for SliceWriter<'_> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        let end = self.pos + bytes.len();
        let Some(dst) = self.buf.get_mut(self.pos..end) else {
            return Err(EncodeError::BufferTooSmall {
                needed: end,
                capacity: self.buf.len(),
            });
        };
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

/// Types that can be sized and written under any strategy.
pub trait Encode {
    /// Exact number of bytes [`Encode::encode`] will write.
    fn size<S: Strategy>(&self) -> usize;

    /// Writes the encoding to `out`, returning the number of bytes written.
    fn encode<S: Strategy, W: EncodeSink>(&self, out: &mut W) -> Result<usize, EncodeError>;

    /// Size shared by every value of this type, if there is one.
    ///
    /// Lets a list of such values be sized as `prefix + count * size`
    /// without visiting the elements.
    fn fixed_size<S: Strategy>() -> Option<usize> {
        None
    }
}

/// Types that can be read back under any strategy.
pub trait Decode {
    /// Overwrites `self` with the value read from `input`.
    ///
    /// Collections inside `self` are resized in place, so decoding repeatedly
    /// into the same instance reuses its allocations. If this fails, `self`
    /// holds an unspecified mix of old and new data.
    fn decode_into<S: Strategy>(&mut self, input: &mut Reader<'_>) -> Result<(), DecodeError>;

    /// Smallest number of bytes any encoding of this type can occupy.
    fn min_size<S: Strategy>() -> usize;

    /// Reads a fresh value from `input`.
    fn decode<S: Strategy>(input: &mut Reader<'_>) -> Result<Self, DecodeError>
    where
        Self: Default,
    {
        let mut value = Self::default();
        value.decode_into::<S>(input)?;
        Ok(value)
    }
}

// Scalars delegate to the strategy
macro_rules! impl_scalar_codec {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn size<S: Strategy>(&self) -> usize {
                    S::scalar_size(*self)
                }

                fn encode<S: Strategy, W: EncodeSink>(
                    &self,
                    out: &mut W,
                ) -> Result<usize, EncodeError> {
                    S::write_scalar(*self, out)
                }

                fn fixed_size<S: Strategy>() -> Option<usize> {
                    S::scalar_fixed_size::<$t>()
                }
            }

            impl Decode for $t {
                fn decode_into<S: Strategy>(
                    &mut self,
                    input: &mut Reader<'_>,
                ) -> Result<(), DecodeError> {
                    *self = S::read_scalar(input)?;
                    Ok(())
                }

                fn min_size<S: Strategy>() -> usize {
                    S::scalar_min_size::<$t>()
                }
            }
        )*
    };
}

impl_scalar_codec!(u8, u16, u32, u64);

// Fixed blobs: raw bytes, length implied by the schema
impl<const N: usize> Encode for [u8; N] {
    fn size<S: Strategy>(&self) -> usize {
        N
    }

    fn encode<S: Strategy, W: EncodeSink>(&self, out: &mut W) -> Result<usize, EncodeError> {
        out.write(self)?;
        Ok(N)
    }

    fn fixed_size<S: Strategy>() -> Option<usize> {
        Some(N)
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode_into<S: Strategy>(&mut self, input: &mut Reader<'_>) -> Result<(), DecodeError> {
        self.copy_from_slice(input.take(N)?);
        Ok(())
    }

    fn min_size<S: Strategy>() -> usize {
        N
    }
}

// Variable lists: count prefix, then the elements
impl<T: Encode> Encode for Vec<T> {
    fn size<S: Strategy>(&self) -> usize {
        let prefix = S::len_size(self.len());
        match T::fixed_size::<S>() {
            Some(each) => prefix + self.len() * each,
            None => prefix + self.iter().map(|item| item.size::<S>()).sum::<usize>(),
        }
    }

    fn encode<S: Strategy, W: EncodeSink>(&self, out: &mut W) -> Result<usize, EncodeError> {
        let mut written = S::write_len(self.len(), out)?;
        for item in self {
            written += item.encode::<S, W>(out)?;
        }
        Ok(written)
    }
}

impl<T: Decode + Default> Decode for Vec<T> {
    fn decode_into<S: Strategy>(&mut self, input: &mut Reader<'_>) -> Result<(), DecodeError> {
        let len = S::read_len(input)?;

        // Refuse counts the remaining input cannot possibly hold before allocating for them.
        input.ensure(len.saturating_mul(T::min_size::<S>()))?;

        self.truncate(len);
        self.resize_with(len, T::default);
        for item in self.iter_mut() {
            item.decode_into::<S>(input)?;
        }
        Ok(())
    }

    fn min_size<S: Strategy>() -> usize {
        S::len_size(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecodeLimits;
    use crate::types::error::Malformed;
    use crate::types::strategy::{FixedWidth, Varint};

    fn encode_with<S: Strategy, T: Encode>(value: &T) -> Vec<u8> {
        let mut out = Vec::new();
        let written = value.encode::<S, _>(&mut out).unwrap();
        assert_eq!(written, out.len());
        assert_eq!(value.size::<S>(), out.len());
        out
    }

    fn decode_with<S: Strategy, T: Decode + Default>(buf: &[u8]) -> Result<T, DecodeError> {
        T::decode::<S>(&mut Reader::new(buf))
    }

    // ========== SliceWriter Tests ==========

    #[test]
    fn slice_writer_tracks_position() {
        let mut buf = [0u8; 4];
        let mut writer = SliceWriter::new(&mut buf);
        writer.write(&[1, 2]).unwrap();
        writer.write(&[3]).unwrap();
        assert_eq!(writer.position(), 3);
        assert_eq!(writer.capacity(), 4);
        assert_eq!(buf, [1, 2, 3, 0]);
    }

    #[test]
    fn slice_writer_refuses_overflow() {
        let mut buf = [0u8; 3];
        let mut writer = SliceWriter::new(&mut buf);
        writer.write(&[1, 2]).unwrap();

        let err = writer.write(&[3, 4]).unwrap_err();
        assert_eq!(
            err,
            EncodeError::BufferTooSmall {
                needed: 4,
                capacity: 3
            }
        );
        assert_eq!(writer.position(), 2);
        assert_eq!(buf, [1, 2, 0]);
    }

    // ========== Scalar Tests ==========

    #[test]
    fn scalar_follows_strategy() {
        assert_eq!(encode_with::<FixedWidth, _>(&100u64), [100, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode_with::<Varint, _>(&100u64), [100]);
        assert_eq!(encode_with::<Varint, _>(&1234u32), [0xD2, 0x09]);
    }

    #[test]
    fn scalar_decodes_into_existing_value() {
        let mut value = 7u32;
        value
            .decode_into::<FixedWidth>(&mut Reader::new(&[1, 0, 0, 0]))
            .unwrap();
        assert_eq!(value, 1);
    }

    // ========== Blob Tests ==========

    #[test]
    fn blob_has_no_prefix() {
        let blob = [0xAAu8; 5];
        assert_eq!(encode_with::<Varint, _>(&blob), [0xAA; 5]);
        assert_eq!(<[u8; 5]>::fixed_size::<Varint>(), Some(5));
    }

    #[test]
    fn empty_blob_is_legal() {
        let blob: [u8; 0] = [];
        assert!(encode_with::<FixedWidth, _>(&blob).is_empty());
        assert_eq!(decode_with::<FixedWidth, [u8; 0]>(&[]).unwrap(), blob);
    }

    #[test]
    fn truncated_blob() {
        let result = decode_with::<FixedWidth, [u8; 20]>(&[0; 19]);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedInput {
                needed: 20,
                remaining: 19
            })
        );
    }

    // ========== List Tests ==========

    #[test]
    fn empty_list_is_one_zero_byte() {
        let empty: Vec<u64> = Vec::new();
        assert_eq!(encode_with::<FixedWidth, _>(&empty), [0x00]);
        assert_eq!(encode_with::<Varint, _>(&empty), [0x00]);
        assert!(decode_with::<Varint, Vec<u64>>(&[0x00]).unwrap().is_empty());
    }

    #[test]
    fn list_of_blobs_is_prefix_plus_raw_bytes() {
        let list = vec![[1u8; 3], [2u8; 3]];
        assert_eq!(encode_with::<FixedWidth, _>(&list), [2, 1, 1, 1, 2, 2, 2]);
        assert_eq!(
            decode_with::<FixedWidth, Vec<[u8; 3]>>(&[2, 1, 1, 1, 2, 2, 2]).unwrap(),
            list
        );
    }

    #[test]
    fn list_of_scalars_uses_element_sizes() {
        let list: Vec<u32> = vec![1, 300, 70_000];
        // 1 + (1 + 2 + 3)
        assert_eq!(list.size::<Varint>(), 7);
        // 1 + 3 * 4
        assert_eq!(list.size::<FixedWidth>(), 13);

        let encoded = encode_with::<Varint, _>(&list);
        assert_eq!(decode_with::<Varint, Vec<u32>>(&encoded).unwrap(), list);
    }

    #[test]
    fn list_decode_reuses_allocation() {
        let mut list: Vec<u64> = Vec::with_capacity(16);
        list.extend([9, 9, 9, 9, 9]);
        let before = list.as_ptr();

        let encoded = encode_with::<Varint, _>(&vec![1u64, 2]);
        list.decode_into::<Varint>(&mut Reader::new(&encoded)).unwrap();

        assert_eq!(list, [1, 2]);
        assert_eq!(list.as_ptr(), before);
        assert!(list.capacity() >= 16);
    }

    #[test]
    fn list_decode_grows_when_needed() {
        let mut list: Vec<u8> = vec![5];
        let encoded = encode_with::<FixedWidth, _>(&vec![1u8, 2, 3, 4]);
        list.decode_into::<FixedWidth>(&mut Reader::new(&encoded)).unwrap();
        assert_eq!(list, [1, 2, 3, 4]);
    }

    #[test]
    fn count_larger_than_input_is_truncated() {
        // Claims 1000 blobs of 32 bytes with only 4 bytes behind it.
        let mut buf = Vec::new();
        FixedWidth::write_len(1000, &mut buf).unwrap();
        buf.extend_from_slice(&[0; 4]);

        let result = decode_with::<FixedWidth, Vec<[u8; 32]>>(&buf);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedInput {
                needed: 32_000,
                remaining: 4
            })
        );
    }

    #[test]
    fn count_above_limit_is_length_overflow() {
        let encoded = encode_with::<Varint, _>(&vec![0u8; 8]);
        let mut reader = Reader::with_limits(&encoded, DecodeLimits::new(4));
        let result = Vec::<u8>::decode::<Varint>(&mut reader);
        assert_eq!(result, Err(DecodeError::LengthOverflow { len: 8, max: 4 }));
    }

    #[test]
    fn list_element_overflow_is_malformed() {
        let encoded = encode_with::<Varint, _>(&vec![1u64, 256]);
        let result = decode_with::<Varint, Vec<u8>>(&encoded);
        assert_eq!(
            result,
            Err(DecodeError::MalformedInput(Malformed::ScalarOverflow {
                value: 256,
                width: 1
            }))
        );
    }

    #[test]
    fn nested_lists_roundtrip() {
        let nested: Vec<Vec<u16>> = vec![vec![], vec![1, 2], vec![u16::MAX]];

        let encoded = encode_with::<Varint, _>(&nested);
        assert_eq!(encoded, [3, 0, 2, 1, 2, 1, 0xFF, 0xFF, 0x03]);
        assert_eq!(decode_with::<Varint, Vec<Vec<u16>>>(&encoded).unwrap(), nested);
        let encoded = encode_with::<FixedWidth, _>(&nested);
        assert_eq!(decode_with::<FixedWidth, Vec<Vec<u16>>>(&encoded).unwrap(), nested);
    }

    #[test]
    fn decode_advances_reader() {
        let mut buf = Vec::new();
        7u8.encode::<Varint, _>(&mut buf).unwrap();
        300u16.encode::<Varint, _>(&mut buf).unwrap();

        let mut reader = Reader::new(&buf);
        assert_eq!(u8::decode::<Varint>(&mut reader).unwrap(), 7);
        assert_eq!(reader.position(), 1);
        assert_eq!(u16::decode::<Varint>(&mut reader).unwrap(), 300);
        assert!(reader.is_empty());
    }
}
