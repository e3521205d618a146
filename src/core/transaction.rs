//! Transactions and the value-transfer outputs they carry.

use crate::types::address::Address;
use crate::types::error::EncodeError;
use crate::types::hash::{Hash, HashBuilder};
use crate::types::signature::Sig;
use crate::types::strategy::Strategy;
use ledger_codec_derive::BinaryCodec;

/// Coins and coin-hours sent to one address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BinaryCodec)]
pub struct TransactionOutput {
    pub address: Address,
    pub coins: u64,
    pub hours: u64,
}

/// A signed transfer spending `inputs` into `outputs`.
///
/// Field order is wire order:
///
/// ```text
/// length | tx_type | inner_hash | sigs[] | inputs[] | outputs[]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, BinaryCodec)]
pub struct Transaction {
    /// Advisory encoded length supplied by the caller; the codec does not check it.
    pub length: u32,
    pub tx_type: u8,
    pub inner_hash: Hash,
    /// One signature per input.
    pub sigs: Vec<Sig>,
    /// Hashes of the unspent outputs being consumed.
    pub inputs: Vec<Hash>,
    pub outputs: Vec<TransactionOutput>,
}

impl Transaction {
    /// SHA3-256 of this transaction's encoding under `S`.
    pub fn hash<S: Strategy>(&self) -> Result<Hash, EncodeError> {
        HashBuilder::digest::<S, _>(self)
    }

    /// Sum of coins across all outputs, or `None` on overflow.
    pub fn total_coins(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.coins))
    }
}
