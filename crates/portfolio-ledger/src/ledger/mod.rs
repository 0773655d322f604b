//! Transaction Ledger
//!
//! Records BUY/SELL transactions and keeps one derived holding per coin
//! using weighted-average cost accounting.
//!
//! ```text
//!   record(tx) ──▶ validate ──▶ ┌──────── store write unit ────────┐
//!                               │  read holding                     │
//!                               │  compute next holding             │
//!                               │  append transaction               │
//!                               │  put / delete holding             │
//!                               └───────────────────────────────────┘
//! ```
//!
//! Buys re-blend the average cost; sells only reduce the amount. A holding
//! that reaches zero (or below) is removed rather than kept at zero.

mod average;

pub use average::weighted_average;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::config::{LedgerConfig, SellPolicy};
use crate::error::{LedgerError, Result};
use crate::model::{Holding, NewTransaction, Transaction, TransactionKind};
use crate::storage::LedgerStore;

/// What a transaction does to the holding of its coin
#[derive(Clone, Debug, PartialEq)]
pub enum HoldingChange {
    Put(Holding),
    Delete,
    Unchanged,
}

/// The transaction ledger, generic over its storage backend
pub struct TransactionLedger<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: LedgerStore> TransactionLedger<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LedgerConfig::default())
    }

    pub fn with_config(store: S, config: LedgerConfig) -> Self {
        tracing::info!("Transaction ledger initialized ({:?} sells)", config.sell_policy);
        Self { store, config }
    }

    /// Record a transaction and update the holding for its coin
    ///
    /// The audit entry and the holding change are written in one unit;
    /// on failure neither is applied.
    pub fn record(
        &self,
        coin_id: &str,
        symbol: &str,
        kind: TransactionKind,
        amount: Decimal,
        price_per_unit: Decimal,
    ) -> Result<Transaction> {
        let new_tx = match validate(coin_id, symbol, kind, amount, price_per_unit) {
            Ok(tx) => tx,
            Err(e) => {
                tracing::warn!("Rejected {} {} {}: {}", kind, amount, symbol, e);
                return Err(e);
            }
        };

        let policy = self.config.sell_policy;
        let result = self.store.write(|unit| {
            // Stamped under the write unit so history order follows insertion order
            let new_tx = NewTransaction {
                timestamp: Utc::now(),
                ..new_tx
            };
            let existing = unit.holding(&new_tx.coin_id)?;
            let change = next_holding(existing.as_ref(), &new_tx, policy)?;

            let recorded = unit.append_transaction(new_tx.clone())?;

            match change {
                HoldingChange::Put(holding) => {
                    tracing::debug!(
                        "{} holding now {} @ {}",
                        holding.symbol,
                        holding.amount,
                        holding.average_buy_price
                    );
                    unit.put_holding(&holding)?;
                }
                HoldingChange::Delete => {
                    tracing::debug!("{} position closed", new_tx.symbol);
                    unit.delete_holding(&new_tx.coin_id)?;
                }
                HoldingChange::Unchanged => {
                    tracing::debug!("{} sold without a holding, nothing to reduce", new_tx.symbol);
                }
            }

            Ok(recorded)
        });

        match &result {
            Ok(tx) => tracing::info!(
                "Transaction recorded: {} {} {} @ ${}",
                tx.kind,
                tx.amount,
                tx.symbol,
                tx.price_per_unit
            ),
            Err(e) if e.is_storage_failure() => tracing::error!("Transaction failed: {}", e),
            Err(e) => tracing::warn!("Transaction rejected: {}", e),
        }

        result
    }

    /// Like [`record`](Self::record), with the kind given as text ("buy", "SELL", ...)
    pub fn record_parsed(
        &self,
        coin_id: &str,
        symbol: &str,
        kind: &str,
        amount: Decimal,
        price_per_unit: Decimal,
    ) -> Result<Transaction> {
        let kind = kind.parse::<TransactionKind>().inspect_err(|e| {
            tracing::warn!("Rejected transaction for {}: {}", coin_id, e);
        })?;
        self.record(coin_id, symbol, kind, amount, price_per_unit)
    }

    /// Current holdings, largest cost basis first
    pub fn list_holdings(&self) -> Result<Vec<Holding>> {
        let mut holdings = self.store.holdings()?;
        holdings.sort_by(|a, b| b.cost_basis().cmp(&a.cost_basis()));
        Ok(holdings)
    }

    /// Transaction history, most recent first
    pub fn list_transactions(&self, coin_id: Option<&str>) -> Result<Vec<Transaction>> {
        let mut transactions = self.store.transactions(coin_id.map(str::trim))?;
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(transactions)
    }

    pub fn holding(&self, coin_id: &str) -> Result<Option<Holding>> {
        let coin_id = coin_id.trim();
        Ok(self
            .store
            .holdings()?
            .into_iter()
            .find(|h| h.coin_id == coin_id))
    }
}

fn validate(
    coin_id: &str,
    symbol: &str,
    kind: TransactionKind,
    amount: Decimal,
    price_per_unit: Decimal,
) -> Result<NewTransaction> {
    let coin_id = coin_id.trim();
    if coin_id.is_empty() {
        return Err(LedgerError::InvalidTransaction("coin id must not be empty".into()));
    }
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidTransaction(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if price_per_unit <= Decimal::ZERO {
        return Err(LedgerError::InvalidTransaction(format!(
            "price per unit must be positive, got {}",
            price_per_unit
        )));
    }

    let total_value = amount.checked_mul(price_per_unit).ok_or_else(|| {
        LedgerError::InvalidTransaction(format!(
            "total value of {} at {} is too large",
            amount, price_per_unit
        ))
    })?;

    Ok(NewTransaction {
        coin_id: coin_id.to_string(),
        symbol: symbol.trim().to_uppercase(),
        kind,
        amount,
        price_per_unit,
        total_value,
        timestamp: Utc::now(),
    })
}

/// Holding transition for one transaction
pub fn next_holding(
    existing: Option<&Holding>,
    tx: &NewTransaction,
    policy: SellPolicy,
) -> Result<HoldingChange> {
    match (tx.kind, existing) {
        (TransactionKind::Buy, None) => Ok(HoldingChange::Put(Holding {
            coin_id: tx.coin_id.clone(),
            symbol: tx.symbol.clone(),
            amount: tx.amount,
            average_buy_price: tx.price_per_unit,
            updated_at: tx.timestamp,
        })),
        (TransactionKind::Buy, Some(current)) => {
            let too_large = || {
                LedgerError::InvalidTransaction(format!(
                    "{} holding would exceed the representable range",
                    tx.symbol
                ))
            };
            let amount = current.amount.checked_add(tx.amount).ok_or_else(too_large)?;
            let average_buy_price = weighted_average(
                current.amount,
                current.average_buy_price,
                tx.amount,
                tx.price_per_unit,
            )
            .ok_or_else(too_large)?;

            Ok(HoldingChange::Put(Holding {
                amount,
                average_buy_price,
                updated_at: tx.timestamp,
                ..current.clone()
            }))
        }
        (TransactionKind::Sell, None) => match policy {
            SellPolicy::Lenient => Ok(HoldingChange::Unchanged),
            SellPolicy::Strict => Err(LedgerError::InvalidTransaction(format!(
                "no {} holding to sell",
                tx.symbol
            ))),
        },
        (TransactionKind::Sell, Some(current)) => {
            let remaining = current.amount - tx.amount;
            if remaining > Decimal::ZERO {
                Ok(HoldingChange::Put(Holding {
                    amount: remaining,
                    updated_at: tx.timestamp,
                    ..current.clone()
                }))
            } else if remaining < Decimal::ZERO && policy == SellPolicy::Strict {
                Err(LedgerError::InvalidTransaction(format!(
                    "cannot sell {} {}, only {} held",
                    tx.amount, tx.symbol, current.amount
                )))
            } else {
                Ok(HoldingChange::Delete)
            }
        }
    }
}
