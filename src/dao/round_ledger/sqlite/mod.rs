//! SQLite-backed round ledger.

mod store;

pub use store::SqliteRoundLedger;
