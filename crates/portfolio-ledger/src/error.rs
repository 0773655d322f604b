//! Error Types for the Portfolio Ledger

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Bad caller input, rejected before any state change
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Persistence unavailable or a write unit failed part-way
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A persisted value could not be read back
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Price feed error: {0}")]
    PriceFeed(String),
}

impl LedgerError {
    /// Whether this error came from the persistence layer
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            LedgerError::StorageFailure(_) | LedgerError::Sqlite(_) | LedgerError::CorruptRecord(_)
        )
    }

    /// Short message suitable for a warning line in the dashboard
    pub fn user_message(&self) -> String {
        match self {
            LedgerError::InvalidTransaction(msg) => format!("Transaction rejected: {}", msg),
            LedgerError::Config(msg) => format!("Configuration problem: {}", msg),
            LedgerError::PriceFeed(_) => "Live prices are unavailable right now.".into(),
            _ => "Portfolio storage is unavailable. Nothing was saved.".into(),
        }
    }
}
