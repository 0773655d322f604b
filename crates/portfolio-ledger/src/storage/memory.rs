//! In-memory ledger store (for tests and ephemeral sessions)

use std::sync::{Mutex, MutexGuard};

use super::{LedgerStore, LedgerWrite};
use crate::error::{LedgerError, Result};
use crate::model::{Holding, NewTransaction, Transaction};

#[derive(Clone, Debug, Default)]
struct MemoryState {
    holdings: Vec<Holding>,
    transactions: Vec<Transaction>,
    next_id: i64,
}

/// Ledger store kept entirely in process memory
///
/// A write unit works on a staged copy of the state that replaces the live
/// state only when the unit succeeds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::StorageFailure("memory store lock poisoned".into()))
    }
}

impl LedgerStore for MemoryStore {
    fn write<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn LedgerWrite) -> Result<R>,
    {
        let mut state = self.lock()?;
        let mut staged = state.clone();
        let result = f(&mut staged)?;
        *state = staged;
        Ok(result)
    }

    fn holdings(&self) -> Result<Vec<Holding>> {
        Ok(self.lock()?.holdings.clone())
    }

    fn transactions(&self, coin_id: Option<&str>) -> Result<Vec<Transaction>> {
        let state = self.lock()?;
        Ok(state
            .transactions
            .iter()
            .filter(|tx| coin_id.is_none_or(|id| tx.coin_id == id))
            .cloned()
            .collect())
    }
}

impl LedgerWrite for MemoryState {
    fn holding(&mut self, coin_id: &str) -> Result<Option<Holding>> {
        Ok(self.holdings.iter().find(|h| h.coin_id == coin_id).cloned())
    }

    fn append_transaction(&mut self, tx: NewTransaction) -> Result<Transaction> {
        self.next_id += 1;
        let tx = tx.into_transaction(self.next_id);
        self.transactions.push(tx.clone());
        Ok(tx)
    }

    fn put_holding(&mut self, holding: &Holding) -> Result<()> {
        match self.holdings.iter_mut().find(|h| h.coin_id == holding.coin_id) {
            Some(existing) => *existing = holding.clone(),
            None => self.holdings.push(holding.clone()),
        }
        Ok(())
    }

    fn delete_holding(&mut self, coin_id: &str) -> Result<()> {
        self.holdings.retain(|h| h.coin_id != coin_id);
        Ok(())
    }
}
