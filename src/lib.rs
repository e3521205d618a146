//! Ledger codec library.
//!
//! Schema-driven binary encoding for signed blocks and transactions, with one
//! record layout shared by a fixed-width and a varint wire format.

pub mod codec;
pub mod config;
pub mod core;
pub mod types;
pub mod utils;
