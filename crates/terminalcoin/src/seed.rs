//! Example Portfolio
//!
//! Transactions recorded by `terminalcoin seed` to demonstrate tracking.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use portfolio_ledger::{LedgerStore, Result, TransactionKind, TransactionLedger};

/// (coin_id, symbol, kind, amount, price per unit)
pub const EXAMPLE_TRANSACTIONS: &[(&str, &str, TransactionKind, Decimal, Decimal)] = &[
    // Bought early and accumulated
    ("bitcoin", "BTC", TransactionKind::Buy, dec!(0.1), dec!(45000.00)),
    ("bitcoin", "BTC", TransactionKind::Buy, dec!(0.05), dec!(62000.00)),
    // Profit taking
    ("ethereum", "ETH", TransactionKind::Buy, dec!(5.0), dec!(2800.00)),
    ("ethereum", "ETH", TransactionKind::Sell, dec!(1.0), dec!(3500.00)),
    ("solana", "SOL", TransactionKind::Buy, dec!(50.0), dec!(85.00)),
    // Bag holding
    ("cardano", "ADA", TransactionKind::Buy, dec!(1000.0), dec!(1.20)),
    ("dogecoin", "DOGE", TransactionKind::Buy, dec!(5000.0), dec!(0.15)),
];

/// Record the example transactions, returning how many were written
pub fn seed_portfolio<S: LedgerStore>(ledger: &TransactionLedger<S>) -> Result<usize> {
    tracing::info!("Seeding portfolio with example data...");

    for (coin_id, symbol, kind, amount, price) in EXAMPLE_TRANSACTIONS {
        ledger.record(coin_id, symbol, *kind, *amount, *price)?;
    }

    tracing::info!("Portfolio seeded with {} transactions", EXAMPLE_TRANSACTIONS.len());
    Ok(EXAMPLE_TRANSACTIONS.len())
}
