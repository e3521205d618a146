//! 32-byte hash blob and a SHA3-256 sink for hashing encodings in place.

use crate::types::encoding::{Encode, EncodeSink};
use crate::types::error::EncodeError;
use crate::types::strategy::Strategy;
use ledger_codec_derive::BinaryCodec;
use sha3::{Digest, Sha3_256};
use std::fmt;

/// Hash length in bytes.
pub const HASH_LEN: usize = 32;

/// Fixed-size 32-byte hash, encoded as a raw blob.
///
/// The codec never computes these for inner hashes or inputs; callers supply
/// them. [`HashBuilder`] exists for digests of encoded records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Ord, PartialOrd, BinaryCodec)]
pub struct Hash(pub [u8; HASH_LEN]);

impl Hash {
    /// All-zero hash, used for genesis parents and unset fields.
    pub const fn zero() -> Hash {
        Hash([0u8; HASH_LEN])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LEN]> for Hash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Hash(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Incremental SHA3-256 hasher.
///
/// Implements [`EncodeSink`] so a record can be hashed while it is encoded,
/// without an intermediate buffer.
pub struct HashBuilder {
    hasher: Sha3_256,
}

impl HashBuilder {
    pub fn new() -> Self {
        Self {
            hasher: Sha3_256::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    pub fn finalize(self) -> Hash {
        Hash(self.hasher.finalize().into())
    }

    /// SHA3-256 of `value` encoded under `S`, streamed straight into the hasher.
    pub fn digest<S: Strategy, T: Encode>(value: &T) -> Result<Hash, EncodeError> {
        let mut builder = Self::new();
        value.encode::<S, _>(&mut builder)?;
        Ok(builder.finalize())
    }
}

impl Default for HashBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeSink for HashBuilder {
    fn write(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.hasher.update(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::strategy::{FixedWidth, Varint};

    #[test]
    fn zero_hash() {
        assert!(Hash::zero().as_slice().iter().all(|&b| b == 0));
        assert_eq!(Hash::zero(), Hash::default());
    }

    #[test]
    fn display_is_lowercase_hex() {
        let mut bytes = [0u8; HASH_LEN];
        bytes[0] = 0xAB;
        bytes[31] = 0x01;
        let shown = Hash(bytes).to_string();
        assert_eq!(shown.len(), 64);
        assert!(shown.starts_with("ab00"));
        assert!(shown.ends_with("01"));
    }

    #[test]
    fn sink_matches_direct_update() {
        let mut direct = HashBuilder::new();
        direct.update(b"ledger");

        let mut sink = HashBuilder::new();
        sink.write(b"led").unwrap();
        sink.write(b"ger").unwrap();

        assert_eq!(direct.finalize(), sink.finalize());
    }

    #[test]
    fn known_digest_of_empty_input() {
        let expected = "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a";
        assert_eq!(HashBuilder::new().finalize().to_string(), expected);
    }

    #[test]
    fn digest_streams_the_encoding() {
        let value: u64 = 300;
        let mut manual = HashBuilder::new();
        manual.update(&[0xAC, 0x02]);
        assert_eq!(HashBuilder::digest::<Varint, _>(&value).unwrap(), manual.finalize());

        let mut manual = HashBuilder::new();
        manual.update(&300u64.to_le_bytes());
        assert_eq!(HashBuilder::digest::<FixedWidth, _>(&value).unwrap(), manual.finalize());
    }
}
