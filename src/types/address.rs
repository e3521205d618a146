//! Versioned 20-byte account addresses.

use ledger_codec_derive::BinaryCodec;

/// Address key length in bytes.
pub const ADDRESS_KEY_LEN: usize = 20;

/// Destination of a transaction output: a version byte plus a 20-byte key.
///
/// Encodes to 21 bytes under the fixed-width strategy and 21 or 22 bytes
/// under varint, depending on whether `version` is below 128.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, BinaryCodec)]
pub struct Address {
    pub version: u8,
    pub key: [u8; ADDRESS_KEY_LEN],
}

impl Address {
    pub const fn new(version: u8, key: [u8; ADDRESS_KEY_LEN]) -> Self {
        Self { version, key }
    }
}
