//! Ledger Configuration

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Default database file, relative to the working directory
pub const DEFAULT_DB_FILE: &str = "terminalcoin.db";

/// How sells that exceed the position are treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellPolicy {
    /// Record the sell; a missing holding is ignored and an oversell
    /// closes the position
    #[default]
    Lenient,

    /// Reject a sell with no holding, or larger than the holding
    Strict,
}

impl FromStr for SellPolicy {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(SellPolicy::Lenient),
            "strict" => Ok(SellPolicy::Strict),
            other => Err(LedgerError::Config(format!(
                "sell policy must be 'lenient' or 'strict', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// SQLite database location
    pub database_path: PathBuf,

    pub sell_policy: SellPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_FILE),
            sell_policy: SellPolicy::Lenient,
        }
    }
}

impl LedgerConfig {
    /// Read `TERMINALCOIN_DB_PATH` and `TERMINALCOIN_SELL_POLICY`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = lookup("TERMINALCOIN_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DB_FILE), PathBuf::from);

        let sell_policy = match lookup("TERMINALCOIN_SELL_POLICY") {
            Some(raw) => raw.parse()?,
            None => SellPolicy::default(),
        };

        Ok(Self {
            database_path,
            sell_policy,
        })
    }

    pub fn with_sell_policy(mut self, sell_policy: SellPolicy) -> Self {
        self.sell_policy = sell_policy;
        self
    }
}
