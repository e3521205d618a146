//! Wire-level building blocks.
//!
//! - `varint`, `fixed`: the two scalar codecs
//! - `strategy`: the `Strategy` capability set selecting between them
//! - `encoding`, `reader`: the Field Layout Engine and its bounds-checked input
//! - `hash`, `signature`, `address`: fixed-blob field types

pub mod address;
pub mod encoding;
pub mod error;
pub mod fixed;
pub mod hash;
pub mod reader;
pub mod signature;
pub mod strategy;
pub mod varint;
