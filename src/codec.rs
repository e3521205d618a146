//! Public `size` / `marshal` / `unmarshal` surface over the Field Layout Engine.
//!
//! A [`Codec`] pins one [`Strategy`] and one set of [`DecodeLimits`]. It is a
//! zero-sized-plus-limits value with no interior state, so a single instance can
//! be shared freely across threads.

use crate::config::DecodeLimits;
use crate::types::encoding::{Decode, Encode, SliceWriter};
use crate::types::error::{DecodeError, EncodeError};
use crate::types::hash::{Hash, HashBuilder};
use crate::types::reader::Reader;
use crate::types::strategy::{FixedWidth, Strategy, Varint};
use crate::warn;
use std::any::type_name;
use std::marker::PhantomData;

/// Encoder/decoder bound to the strategy `S`.
#[derive(Debug, Clone, Copy)]
pub struct Codec<S: Strategy> {
    limits: DecodeLimits,
    _strategy: PhantomData<S>,
}

/// Little-endian fixed-width codec.
pub type FixedCodec = Codec<FixedWidth>;

/// LEB128 varint codec.
pub type VarintCodec = Codec<Varint>;

impl<S: Strategy> Codec<S> {
    /// Codec with no collection cap: anything `marshal` produces, `unmarshal` accepts.
    ///
    /// Decoding still refuses any count the remaining input cannot hold, so
    /// allocation stays bounded by the buffer length.
    pub const fn new() -> Self {
        Self::with_limits(DecodeLimits::unlimited())
    }

    /// Codec capped by [`DecodeLimits::from_env`], for decoding untrusted input.
    pub fn from_env() -> Self {
        Self::with_limits(DecodeLimits::from_env())
    }

    pub const fn with_limits(limits: DecodeLimits) -> Self {
        Self {
            limits,
            _strategy: PhantomData,
        }
    }

    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// Exact number of bytes `marshal` will produce for `value`.
    pub fn size<T: Encode>(&self, value: &T) -> u64 {
        value.size::<S>() as u64
    }

    /// Encodes `value`, reusing `buf` when its capacity already covers the encoded size.
    ///
    /// Performs at most one allocation: none when `buf` is large enough, one
    /// exactly-sized allocation otherwise. The returned vector's length is the
    /// encoded size.
    pub fn marshal<T: Encode>(
        &self,
        value: &T,
        buf: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, EncodeError> {
        let size = value.size::<S>();
        let mut out = match buf {
            Some(mut reused) if reused.capacity() >= size => {
                reused.clear();
                reused.resize(size, 0);
                reused
            }
            _ => vec![0u8; size],
        };

        let written = value.encode::<S, _>(&mut SliceWriter::new(&mut out))?;
        out.truncate(written);
        Ok(out)
    }

    /// Encodes `value` into the front of `buf`, returning the number of bytes written.
    ///
    /// Fails with [`EncodeError::BufferTooSmall`] before writing anything if
    /// `buf` is shorter than the encoded size.
    pub fn marshal_into<T: Encode>(&self, value: &T, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let size = value.size::<S>();
        if buf.len() < size {
            let err = EncodeError::BufferTooSmall {
                needed: size,
                capacity: buf.len(),
            };
            warn!("{} marshal of {} refused: {}", S::NAME, type_name::<T>(), err);
            return Err(err);
        }
        value.encode::<S, _>(&mut SliceWriter::new(buf))
    }

    /// Appends the encoding of `value` to `out`, returning the number of bytes appended.
    pub fn marshal_append<T: Encode>(&self, value: &T, out: &mut Vec<u8>) -> Result<usize, EncodeError> {
        out.reserve_exact(value.size::<S>());
        value.encode::<S, _>(out)
    }

    /// Decodes a fresh `T` from the front of `buf`.
    ///
    /// Returns the value and the number of bytes consumed. Bytes after the
    /// record are left alone, so a stream of concatenated records can be walked
    /// by slicing off `consumed` each time.
    pub fn unmarshal<T: Decode + Default>(&self, buf: &[u8]) -> Result<(T, usize), DecodeError> {
        let mut value = T::default();
        let consumed = self.unmarshal_into(&mut value, buf)?;
        Ok((value, consumed))
    }

    /// Decodes into an existing instance, reusing the storage of its collections.
    ///
    /// On error the contents of `dst` are unspecified and must not be trusted.
    pub fn unmarshal_into<T: Decode>(&self, dst: &mut T, buf: &[u8]) -> Result<usize, DecodeError> {
        let mut reader = Reader::with_limits(buf, self.limits);
        match dst.decode_into::<S>(&mut reader) {
            Ok(()) => Ok(reader.position()),
            Err(err) => {
                warn!(
                    "{} unmarshal of {} rejected at byte {}: {}",
                    S::NAME,
                    type_name::<T>(),
                    reader.position(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Decodes a `T` that must span the whole of `buf`.
    pub fn from_bytes<T: Decode + Default>(&self, buf: &[u8]) -> Result<T, DecodeError> {
        let (value, consumed) = self.unmarshal(buf)?;
        if consumed != buf.len() {
            let err = DecodeError::TrailingBytes(buf.len() - consumed);
            warn!("{} decode of {}: {}", S::NAME, type_name::<T>(), err);
            return Err(err);
        }
        Ok(value)
    }

    /// SHA3-256 of the encoding of `value`, computed without buffering it.
    pub fn digest<T: Encode>(&self, value: &T) -> Result<Hash, EncodeError> {
        HashBuilder::digest::<S, _>(value)
    }
}

impl<S: Strategy> Default for Codec<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_COLLECTION_LEN;
    use crate::core::block::SignedBlock;
    use crate::core::transaction::Transaction;
    use crate::types::error::Malformed;
    use crate::utils::test_utils::utils::{
        reference_transaction, sample_signed_block, sample_transaction,
    };

    // ========== Round-trip Tests ==========

    #[test]
    fn signed_block_roundtrip_both_strategies() {
        let block = sample_signed_block();

        let fixed = FixedCodec::new();
        let bytes = fixed.marshal(&block, None).unwrap();
        assert_eq!(bytes.len() as u64, fixed.size(&block));
        let (decoded, consumed) = fixed.unmarshal::<SignedBlock>(&bytes).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(consumed, bytes.len());

        let varint = VarintCodec::new();
        let bytes = varint.marshal(&block, None).unwrap();
        assert_eq!(bytes.len() as u64, varint.size(&block));
        let (decoded, consumed) = varint.unmarshal::<SignedBlock>(&bytes).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn frozen_sizes() {
        let block = sample_signed_block();
        assert_eq!(FixedCodec::new().size(&block), 1516);
        assert_eq!(VarintCodec::new().size(&block), 1421);

        let tx = reference_transaction();
        assert_eq!(FixedCodec::new().size(&tx), 174);
        assert_eq!(VarintCodec::new().size(&tx), 158);
    }

    #[test]
    fn strategy_divergence_on_small_fee() {
        let mut block = sample_signed_block();
        block.block.head.fee = 100;

        let fixed = FixedCodec::new().marshal(&block, None).unwrap();
        let varint = VarintCodec::new().marshal(&block, None).unwrap();
        assert!(varint.len() < fixed.len());

        assert_eq!(FixedCodec::new().from_bytes::<SignedBlock>(&fixed).unwrap(), block);
        assert_eq!(VarintCodec::new().from_bytes::<SignedBlock>(&varint).unwrap(), block);
    }

    // ========== Buffer Management Tests ==========

    #[test]
    fn marshal_reuses_large_enough_buffer() {
        let codec = VarintCodec::new();
        let tx = sample_transaction(0);

        let buf = Vec::with_capacity(4096);
        let ptr = buf.as_ptr();
        let out = codec.marshal(&tx, Some(buf)).unwrap();

        assert_eq!(out.as_ptr(), ptr);
        assert_eq!(out.len() as u64, codec.size(&tx));
        assert_eq!(codec.from_bytes::<Transaction>(&out).unwrap(), tx);
    }

    #[test]
    fn marshal_overwrites_stale_contents() {
        let codec = FixedCodec::new();
        let tx = reference_transaction();

        let stale = vec![0xEE; 300];
        let out = codec.marshal(&tx, Some(stale)).unwrap();
        assert_eq!(out, codec.marshal(&tx, None).unwrap());
    }

    #[test]
    fn marshal_replaces_small_buffer() {
        let codec = FixedCodec::new();
        let tx = sample_transaction(2);

        let small = Vec::with_capacity(8);
        let out = codec.marshal(&tx, Some(small)).unwrap();
        assert_eq!(out.len(), 442);
        assert!(out.capacity() >= 442);
    }

    #[test]
    fn marshal_into_checks_capacity() {
        let codec = FixedCodec::new();
        let tx = reference_transaction();

        let mut short = [0u8; 173];
        assert_eq!(
            codec.marshal_into(&tx, &mut short),
            Err(EncodeError::BufferTooSmall {
                needed: 174,
                capacity: 173
            })
        );
        assert!(short.iter().all(|&b| b == 0));

        let mut exact = [0u8; 200];
        assert_eq!(codec.marshal_into(&tx, &mut exact).unwrap(), 174);
        assert_eq!(&exact[..174], codec.marshal(&tx, None).unwrap().as_slice());
        assert!(exact[174..].iter().all(|&b| b == 0));
    }

    #[test]
    fn appended_records_decode_sequentially() {
        let codec = VarintCodec::new();
        let txs: Vec<Transaction> = (0..3).map(sample_transaction).collect();

        let mut stream = Vec::new();
        for tx in &txs {
            let written = codec.marshal_append(tx, &mut stream).unwrap();
            assert_eq!(written as u64, codec.size(tx));
        }

        let mut rest = stream.as_slice();
        let mut decoded = Vec::new();
        while !rest.is_empty() {
            let (tx, consumed) = codec.unmarshal::<Transaction>(rest).unwrap();
            decoded.push(tx);
            rest = &rest[consumed..];
        }
        assert_eq!(decoded, txs);
    }

    #[test]
    fn unmarshal_into_reuses_instance() {
        let codec = FixedCodec::new();
        let mut target = sample_transaction(1);
        target.sigs.reserve(10);
        let sigs_ptr = target.sigs.as_ptr();

        let source = reference_transaction();
        let bytes = codec.marshal(&source, None).unwrap();
        assert_eq!(codec.unmarshal_into(&mut target, &bytes).unwrap(), 174);
        assert_eq!(target, source);
        assert_eq!(target.sigs.as_ptr(), sigs_ptr);
    }

    // ========== Rejection Tests ==========

    #[test]
    fn unmarshal_ignores_trailing_bytes_but_from_bytes_rejects_them() {
        let codec = VarintCodec::new();
        let tx = reference_transaction();
        let mut bytes = codec.marshal(&tx, None).unwrap();
        bytes.extend_from_slice(&[1, 2, 3]);

        let (decoded, consumed) = codec.unmarshal::<Transaction>(&bytes).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(consumed, 158);

        assert_eq!(
            codec.from_bytes::<Transaction>(&bytes),
            Err(DecodeError::TrailingBytes(3))
        );
    }

    #[test]
    fn every_prefix_of_block_is_truncated() {
        let codec = VarintCodec::new();
        let bytes = codec.marshal(&sample_signed_block(), None).unwrap();
        for end in 0..bytes.len() {
            assert!(
                matches!(
                    codec.unmarshal::<SignedBlock>(&bytes[..end]),
                    Err(DecodeError::TruncatedInput { .. })
                ),
                "prefix {end}"
            );
        }
    }

    #[test]
    fn limits_cap_collection_counts() {
        let tx = sample_transaction(0);
        let bytes = FixedCodec::new().marshal(&tx, None).unwrap();

        let strict = FixedCodec::with_limits(DecodeLimits::new(2));
        assert_eq!(strict.limits().max_collection_len, 2);
        assert_eq!(
            strict.unmarshal::<Transaction>(&bytes),
            Err(DecodeError::LengthOverflow { len: 3, max: 2 })
        );

        let relaxed = FixedCodec::with_limits(DecodeLimits::new(3));
        assert_eq!(relaxed.from_bytes::<Transaction>(&bytes).unwrap(), tx);
    }

    #[test]
    fn default_codec_accepts_every_list_it_marshals() {
        let codec = FixedCodec::new();
        assert_eq!(codec.limits(), DecodeLimits::unlimited());

        let long = vec![7u8; DEFAULT_MAX_COLLECTION_LEN + 1];
        let bytes = codec.marshal(&long, None).unwrap();
        let (decoded, consumed) = codec.unmarshal::<Vec<u8>>(&bytes).unwrap();
        assert_eq!(consumed as u64, codec.size(&long));
        assert_eq!(decoded, long);

        let capped = FixedCodec::with_limits(DecodeLimits::default());
        assert_eq!(
            capped.unmarshal::<Vec<u8>>(&bytes),
            Err(DecodeError::LengthOverflow {
                len: DEFAULT_MAX_COLLECTION_LEN as u64 + 1,
                max: DEFAULT_MAX_COLLECTION_LEN
            })
        );
    }

    #[test]
    fn over_wide_varint_is_malformed() {
        let codec = VarintCodec::new();
        // tx_type (u8) encoded as 300
        let mut bytes = vec![0x01, 0xAC, 0x02];
        bytes.extend_from_slice(&[0; 35]);
        assert_eq!(
            codec.unmarshal::<Transaction>(&bytes),
            Err(DecodeError::MalformedInput(Malformed::ScalarOverflow {
                value: 300,
                width: 1
            }))
        );
    }

    // ========== Digest Tests ==========

    #[test]
    fn digest_matches_hash_of_marshalled_bytes() {
        let codec = VarintCodec::new();
        let tx = sample_transaction(2);

        let mut hasher = HashBuilder::new();
        hasher.update(&codec.marshal(&tx, None).unwrap());
        assert_eq!(codec.digest(&tx).unwrap(), hasher.finalize());
        assert_eq!(codec.digest(&tx).unwrap(), tx.hash::<Varint>().unwrap());
    }

    // ========== Concurrency Tests ==========

    #[test]
    fn independent_records_encode_concurrently() {
        let codec = VarintCodec::new();
        let expected = codec.marshal(&sample_signed_block(), None).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        let block = sample_signed_block();
                        let bytes = codec.marshal(&block, None).unwrap();
                        let decoded = codec.from_bytes::<SignedBlock>(&bytes).unwrap();
                        assert_eq!(decoded, block);
                        bytes
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
