//! SQLite ledger store

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use rust_decimal::Decimal;

use super::{LedgerStore, LedgerWrite};
use crate::error::{LedgerError, Result};
use crate::model::{Holding, NewTransaction, Transaction, TransactionKind};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS holdings (
        coin_id TEXT PRIMARY KEY,
        symbol TEXT NOT NULL,
        amount TEXT NOT NULL,
        average_buy_price TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        coin_id TEXT NOT NULL,
        symbol TEXT NOT NULL,
        kind TEXT NOT NULL CHECK (kind IN ('BUY', 'SELL')),
        amount TEXT NOT NULL,
        price_per_unit TEXT NOT NULL,
        total_value TEXT NOT NULL,
        timestamp TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_transactions_coin ON transactions(coin_id);
";

/// Ledger store backed by a SQLite database file
///
/// Decimals are stored as TEXT so values round-trip exactly.
pub struct SqliteStore {
    connection: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                LedgerError::StorageFailure(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        tracing::info!("Opening ledger database at {}", path.display());

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        Self::from_connection(conn, path)
    }

    /// In-memory database, gone when the store is dropped
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, PathBuf::from(":memory:"))
    }

    fn from_connection(conn: Connection, path: PathBuf) -> Result<Self> {
        if let Err(e) = conn.execute_batch(SCHEMA) {
            tracing::error!("Failed to apply ledger schema: {}", e);
            return Err(e.into());
        }

        Ok(Self {
            connection: Mutex::new(conn),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the database is reachable
    pub fn health_check(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| LedgerError::StorageFailure("sqlite connection lock poisoned".into()))
    }
}

impl LedgerStore for SqliteStore {
    fn write<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn LedgerWrite) -> Result<R>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // Dropping `tx` without commit rolls everything back
        let result = {
            let mut unit = SqliteWrite { conn: &tx };
            f(&mut unit)?
        };

        tx.commit()?;
        Ok(result)
    }

    fn holdings(&self) -> Result<Vec<Holding>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT coin_id, symbol, amount, average_buy_price, updated_at
             FROM holdings
             ORDER BY rowid",
        )?;

        let rows = stmt
            .query_map([], HoldingRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(HoldingRow::into_holding).collect()
    }

    fn transactions(&self, coin_id: Option<&str>) -> Result<Vec<Transaction>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, coin_id, symbol, kind, amount, price_per_unit, total_value, timestamp
             FROM transactions
             WHERE ?1 IS NULL OR coin_id = ?1
             ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![coin_id], TransactionRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(TransactionRow::into_transaction).collect()
    }
}

struct SqliteWrite<'a> {
    conn: &'a Connection,
}

impl LedgerWrite for SqliteWrite<'_> {
    fn holding(&mut self, coin_id: &str) -> Result<Option<Holding>> {
        let row = self
            .conn
            .query_row(
                "SELECT coin_id, symbol, amount, average_buy_price, updated_at
                 FROM holdings WHERE coin_id = ?1",
                [coin_id],
                HoldingRow::from_row,
            )
            .optional()?;

        row.map(HoldingRow::into_holding).transpose()
    }

    fn append_transaction(&mut self, tx: NewTransaction) -> Result<Transaction> {
        self.conn.execute(
            "INSERT INTO transactions (
                coin_id, symbol, kind, amount, price_per_unit, total_value, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tx.coin_id,
                tx.symbol,
                tx.kind.as_str(),
                tx.amount.to_string(),
                tx.price_per_unit.to_string(),
                tx.total_value.to_string(),
                tx.timestamp,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(tx.into_transaction(id))
    }

    fn put_holding(&mut self, holding: &Holding) -> Result<()> {
        self.conn.execute(
            "INSERT INTO holdings (coin_id, symbol, amount, average_buy_price, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(coin_id) DO UPDATE SET
                symbol = excluded.symbol,
                amount = excluded.amount,
                average_buy_price = excluded.average_buy_price,
                updated_at = excluded.updated_at",
            params![
                holding.coin_id,
                holding.symbol,
                holding.amount.to_string(),
                holding.average_buy_price.to_string(),
                holding.updated_at,
            ],
        )?;
        Ok(())
    }

    fn delete_holding(&mut self, coin_id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM holdings WHERE coin_id = ?1", [coin_id])?;
        Ok(())
    }
}

/// Raw column values, parsed outside the rusqlite row closure
struct HoldingRow {
    coin_id: String,
    symbol: String,
    amount: String,
    average_buy_price: String,
    updated_at: DateTime<Utc>,
}

impl HoldingRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            coin_id: row.get(0)?,
            symbol: row.get(1)?,
            amount: row.get(2)?,
            average_buy_price: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_holding(self) -> Result<Holding> {
        Ok(Holding {
            amount: parse_decimal("holdings.amount", &self.amount)?,
            average_buy_price: parse_decimal("holdings.average_buy_price", &self.average_buy_price)?,
            coin_id: self.coin_id,
            symbol: self.symbol,
            updated_at: self.updated_at,
        })
    }
}

struct TransactionRow {
    id: i64,
    coin_id: String,
    symbol: String,
    kind: String,
    amount: String,
    price_per_unit: String,
    total_value: String,
    timestamp: DateTime<Utc>,
}

impl TransactionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            coin_id: row.get(1)?,
            symbol: row.get(2)?,
            kind: row.get(3)?,
            amount: row.get(4)?,
            price_per_unit: row.get(5)?,
            total_value: row.get(6)?,
            timestamp: row.get(7)?,
        })
    }

    fn into_transaction(self) -> Result<Transaction> {
        let kind = TransactionKind::from_str(&self.kind).map_err(|_| {
            LedgerError::CorruptRecord(format!("transaction {} has kind '{}'", self.id, self.kind))
        })?;

        Ok(Transaction {
            id: self.id,
            kind,
            amount: parse_decimal("transactions.amount", &self.amount)?,
            price_per_unit: parse_decimal("transactions.price_per_unit", &self.price_per_unit)?,
            total_value: parse_decimal("transactions.total_value", &self.total_value)?,
            coin_id: self.coin_id,
            symbol: self.symbol,
            timestamp: self.timestamp,
        })
    }
}

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| LedgerError::CorruptRecord(format!("{} = '{}': {}", column, raw, e)))
}
