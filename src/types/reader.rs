//! Bounds-checked cursor over untrusted input.
//!
//! Every byte the decoder looks at goes through [`Reader`]. Each read checks
//! the requested span against what is left before touching the buffer and
//! fails with [`DecodeError::TruncatedInput`] instead of reading past the end.

use crate::config::DecodeLimits;
use crate::types::error::DecodeError;

/// Forward-only cursor over an input buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    limits: DecodeLimits,
}

impl<'a> Reader<'a> {
    /// Creates a reader with the default limits.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_limits(buf, DecodeLimits::default())
    }

    pub fn with_limits(buf: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            buf,
            pos: 0,
            limits,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// The unread tail, without consuming it.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Fails unless at least `n` bytes remain.
    pub fn ensure(&self, n: usize) -> Result<(), DecodeError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(DecodeError::TruncatedInput {
                needed: n,
                remaining,
            });
        }
        Ok(())
    }

    /// Consumes exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Consumes one byte.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let bytes = self.take(1)?;
        Ok(bytes[0])
    }

    /// Skips `n` bytes the caller has already inspected through [`Reader::rest`].
    pub(crate) fn advance(&mut self, n: usize) -> Result<(), DecodeError> {
        self.take(n).map(|_| ())
    }
}
