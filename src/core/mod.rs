//! Ledger records.
//!
//! - `SignedBlock`: the root record, a signature over a `Block`
//! - `Block`: header plus a body of transactions
//! - `Transaction`: signatures, spent inputs and new outputs

pub mod block;
pub mod transaction;
