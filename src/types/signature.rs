//! 65-byte recoverable signature blob.

use ledger_codec_derive::BinaryCodec;

/// Signature length in bytes.
pub const SIG_LEN: usize = 65;

/// Raw 65-byte signature. The codec treats it as opaque bytes; nothing here verifies it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BinaryCodec)]
pub struct Sig(pub [u8; SIG_LEN]);

impl Sig {
    pub const fn zero() -> Sig {
        Sig([0u8; SIG_LEN])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

// Arrays this long have no `Default` impl of their own.
impl Default for Sig {
    fn default() -> Self {
        Sig::zero()
    }
}

impl From<[u8; SIG_LEN]> for Sig {
    fn from(bytes: [u8; SIG_LEN]) -> Self {
        Sig(bytes)
    }
}
