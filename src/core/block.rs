//! Block header, body and the signed block that is the codec's root record.

use crate::core::transaction::Transaction;
use crate::types::error::EncodeError;
use crate::types::hash::{Hash, HashBuilder};
use crate::types::signature::Sig;
use crate::types::strategy::Strategy;
use ledger_codec_derive::BinaryCodec;

/// Block metadata and commitments.
///
/// 124 bytes under the fixed-width strategy; under varint the four scalars
/// shrink with their values.
#[derive(Clone, Debug, Default, PartialEq, Eq, BinaryCodec)]
pub struct BlockHeader {
    pub version: u32,
    /// Unix time in seconds.
    pub time: u64,
    /// Height of this block in the chain (genesis = 0).
    pub block_seq: u64,
    pub fee: u64,
    pub prev_hash: Hash,
    pub body_hash: Hash,
    pub ux_hash: Hash,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BinaryCodec)]
pub struct BlockBody {
    pub transactions: Vec<Transaction>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, BinaryCodec)]
pub struct Block {
    pub head: BlockHeader,
    pub body: BlockBody,
}

impl Block {
    /// SHA3-256 of the encoded header under `S`, identifying the block.
    pub fn hash<S: Strategy>(&self) -> Result<Hash, EncodeError> {
        HashBuilder::digest::<S, _>(&self.head)
    }

    pub fn seq(&self) -> u64 {
        self.head.block_seq
    }
}

/// A block together with the producer's signature over it.
///
/// This is the unit handed to `size`, `marshal` and `unmarshal`.
#[derive(Clone, Debug, Default, PartialEq, Eq, BinaryCodec)]
pub struct SignedBlock {
    pub sig: Sig,
    pub block: Block,
}
