//! Runtime configuration: decode limits and log level.
//!
//! Encoded collections carry their own length, so a hostile buffer can claim an
//! arbitrarily large count. The decoder always refuses a count the remaining
//! input cannot hold; [`DecodeLimits`] adds an opt-in cap on top of that for
//! callers decoding untrusted input.

use crate::utils::log::Level;
use crate::warn;
use std::env;

/// Environment variable selecting the minimum log level (`info`, `warn`, `error`).
pub const LOG_LEVEL_ENV: &str = "LEDGER_CODEC_LOG_LEVEL";

/// Environment variable overriding [`DecodeLimits::max_collection_len`].
pub const MAX_COLLECTION_LEN_ENV: &str = "LEDGER_CODEC_MAX_COLLECTION_LEN";

/// Default cap on a single decoded collection count.
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1_000_000;

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest count accepted for any single list (signatures, inputs, outputs, transactions).
    pub max_collection_len: usize,
}

impl DecodeLimits {
    pub const fn new(max_collection_len: usize) -> Self {
        Self { max_collection_len }
    }

    /// No cap beyond what the input length itself allows.
    pub const fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// Reads limits from the environment, keeping the default for anything unset or unparsable.
    pub fn from_env() -> Self {
        let Ok(raw) = env::var(MAX_COLLECTION_LEN_ENV) else {
            return Self::default();
        };
        match raw.trim().parse() {
            Ok(max_collection_len) => Self::new(max_collection_len),
            Err(e) => {
                warn!(
                    "Ignoring {}={:?} ({}), using {}",
                    MAX_COLLECTION_LEN_ENV, raw, e, DEFAULT_MAX_COLLECTION_LEN
                );
                Self::default()
            }
        }
    }
}

/// Log level named by [`LOG_LEVEL_ENV`], if set to a known level.
pub fn log_level_from_env() -> Option<Level> {
    let raw = env::var(LOG_LEVEL_ENV).ok()?;
    match raw.parse() {
        Ok(level) => Some(level),
        Err(e) => {
            warn!("Ignoring {}: {}", LOG_LEVEL_ENV, e);
            None
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COLLECTION_LEN)
    }
}
