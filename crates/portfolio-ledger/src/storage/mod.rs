//! Ledger Storage
//!
//! The persistence contract the ledger requires: a `holdings` set keyed by
//! coin id and an append-only `transactions` set, both written together in
//! a single atomic unit.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::model::{Holding, NewTransaction, Transaction};

/// Storage backend trait
///
/// `write` runs its closure as one serialized, all-or-nothing unit: if the
/// closure returns an error, neither the appended transaction nor any
/// holding change is kept.
pub trait LedgerStore: Send + Sync {
    /// Run `f` atomically against the store
    fn write<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn LedgerWrite) -> Result<R>;

    /// All holdings in storage order
    fn holdings(&self) -> Result<Vec<Holding>>;

    /// All transactions in insertion order, optionally for one coin
    fn transactions(&self, coin_id: Option<&str>) -> Result<Vec<Transaction>>;
}

/// Operations available inside a write unit
pub trait LedgerWrite {
    fn holding(&mut self, coin_id: &str) -> Result<Option<Holding>>;

    /// Append an audit entry, returning it with its generated id
    fn append_transaction(&mut self, tx: NewTransaction) -> Result<Transaction>;

    /// Insert or replace the holding for `holding.coin_id`
    fn put_holding(&mut self, holding: &Holding) -> Result<()>;

    fn delete_holding(&mut self, coin_id: &str) -> Result<()>;
}
