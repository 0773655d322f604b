//! Domain Models
//!
//! Core data types for the transaction ledger and portfolio valuation.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Direction of a transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => "BUY",
            TransactionKind::Sell => "SELL",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TransactionKind::Buy),
            "SELL" => Ok(TransactionKind::Sell),
            other => Err(LedgerError::InvalidTransaction(format!(
                "unknown transaction kind '{}'",
                other
            ))),
        }
    }
}

/// A validated transaction that has not been persisted yet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub coin_id: String,
    pub symbol: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub price_per_unit: Decimal,
    pub total_value: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl NewTransaction {
    /// Attach the store-generated identifier
    pub fn into_transaction(self, id: i64) -> Transaction {
        Transaction {
            id,
            coin_id: self.coin_id,
            symbol: self.symbol,
            kind: self.kind,
            amount: self.amount,
            price_per_unit: self.price_per_unit,
            total_value: self.total_value,
            timestamp: self.timestamp,
        }
    }
}

/// An immutable entry in the audit trail
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-generated identifier, increasing in insertion order
    pub id: i64,

    /// External asset identifier (e.g., "bitcoin")
    pub coin_id: String,

    /// Ticker symbol (e.g., "BTC")
    pub symbol: String,

    pub kind: TransactionKind,

    /// Quantity transacted
    pub amount: Decimal,

    /// Unit price in USD at transaction time
    pub price_per_unit: Decimal,

    /// amount * price_per_unit, fixed at record time
    pub total_value: Decimal,

    /// Assigned by the ledger when written
    pub timestamp: DateTime<Utc>,
}

/// Current position in one asset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub coin_id: String,
    pub symbol: String,

    /// Quantity on hand, always positive while the holding exists
    pub amount: Decimal,

    /// Weighted average cost per unit across buys
    pub average_buy_price: Decimal,

    pub updated_at: DateTime<Utc>,
}

impl Holding {
    pub fn new(
        coin_id: impl Into<String>,
        symbol: impl Into<String>,
        amount: Decimal,
        average_buy_price: Decimal,
    ) -> Self {
        Self {
            coin_id: coin_id.into(),
            symbol: symbol.into().to_uppercase(),
            amount,
            average_buy_price,
            updated_at: Utc::now(),
        }
    }

    /// Total paid for the quantity currently held, saturating at `Decimal::MAX`
    pub fn cost_basis(&self) -> Decimal {
        self.amount.saturating_mul(self.average_buy_price)
    }
}

/// Valuation of a single holding against a current price
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub coin_id: String,
    pub symbol: String,
    pub amount: Decimal,
    pub avg_buy_price: Decimal,
    pub current_price: Decimal,

    /// amount * current_price
    pub current_value: Decimal,

    /// Unrealized P&L
    pub pnl: Decimal,

    /// Unrealized P&L percentage of cost basis
    pub pnl_percent: Decimal,
}

impl PortfolioItem {
    pub fn cost_basis(&self) -> Decimal {
        self.amount.saturating_mul(self.avg_buy_price)
    }
}

/// Current prices keyed by coin id, as supplied by a price feed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceMap(HashMap<String, Decimal>);

impl PriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coin_id: &str) -> Option<Decimal> {
        self.0.get(coin_id).copied()
    }

    pub fn insert(&mut self, coin_id: impl Into<String>, price: Decimal) {
        self.0.insert(coin_id.into(), price);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, Decimal>> for PriceMap {
    fn from(prices: HashMap<String, Decimal>) -> Self {
        Self(prices)
    }
}

impl FromIterator<(String, Decimal)> for PriceMap {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
