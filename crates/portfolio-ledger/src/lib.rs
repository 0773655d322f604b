//! # portfolio-ledger
//!
//! Transaction ledger and P&L valuation for a personal crypto portfolio.
//!
//! ## Model
//!
//! - **Transactions** are immutable BUY/SELL facts forming the audit trail.
//! - **Holdings** are derived, one per coin, using weighted-average cost:
//!   buys re-blend the average, sells only reduce the amount.
//! - **Portfolio items** are computed on demand from holdings and a price map.
//!
//! ## Example
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  BUY  0.10 BTC @ $45,000      holding 0.10 @ $45,000.00      │
//! │  BUY  0.05 BTC @ $62,000      holding 0.15 @ $50,666.67      │
//! │  SELL 0.05 BTC @ $90,000      holding 0.10 @ $50,666.67      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  price $97,500  →  value $9,750.00   P&L +$4,683.33 (+92.43%)│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use portfolio_ledger::{PortfolioValuator, SqliteStore, TransactionKind, TransactionLedger};
//! use rust_decimal_macros::dec;
//!
//! let ledger = TransactionLedger::new(SqliteStore::open("terminalcoin.db")?);
//! ledger.record("bitcoin", "btc", TransactionKind::Buy, dec!(0.1), dec!(45000))?;
//!
//! let holdings = ledger.list_holdings()?;
//! let summary = PortfolioValuator::snapshot(&holdings, &prices);
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod model;
pub mod report;
pub mod storage;
pub mod valuation;

pub use config::{LedgerConfig, SellPolicy};
pub use error::{LedgerError, Result};
pub use feed::{PriceFeed, StaticPriceFeed};
pub use ledger::{weighted_average, TransactionLedger};
pub use model::{Holding, PortfolioItem, PriceMap, Transaction, TransactionKind};
pub use storage::{LedgerStore, MemoryStore, SqliteStore};
pub use valuation::{PortfolioSummary, PortfolioValuator};
