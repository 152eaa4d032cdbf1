//! Persistence layer: the round ledger capability and its backends.

pub mod round_ledger;
pub mod storage;
