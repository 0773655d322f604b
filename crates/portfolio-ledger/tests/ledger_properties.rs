//! Ledger behaviour against both storage backends

use std::collections::HashMap;

use portfolio_ledger::storage::LedgerWrite;
use portfolio_ledger::{
    Holding, LedgerConfig, LedgerError, LedgerStore, MemoryStore, PortfolioValuator, PriceFeed,
    PriceMap, Result, SellPolicy, SqliteStore, StaticPriceFeed, Transaction, TransactionKind,
    TransactionLedger,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use TransactionKind::{Buy, Sell};

fn sqlite_ledger(dir: &TempDir) -> TransactionLedger<SqliteStore> {
    TransactionLedger::new(SqliteStore::open(dir.path().join("ledger.db")).unwrap())
}

fn buy_buy_sell_sell<S: LedgerStore>(ledger: &TransactionLedger<S>) {
    ledger.record("bitcoin", "btc", Buy, dec!(1.0), dec!(100)).unwrap();
    ledger.record("bitcoin", "btc", Buy, dec!(1.0), dec!(300)).unwrap();

    let holding = ledger.holding("bitcoin").unwrap().unwrap();
    assert_eq!(holding.amount, dec!(2.0));
    assert_eq!(holding.average_buy_price, dec!(200.0));
    assert_eq!(holding.symbol, "BTC");

    ledger.record("bitcoin", "btc", Sell, dec!(0.5), dec!(999)).unwrap();

    let holding = ledger.holding("bitcoin").unwrap().unwrap();
    assert_eq!(holding.amount, dec!(1.5));
    assert_eq!(holding.average_buy_price, dec!(200.0));

    ledger.record("bitcoin", "btc", Sell, dec!(1.5), dec!(500)).unwrap();

    assert!(ledger.holding("bitcoin").unwrap().is_none());
    assert!(ledger.list_holdings().unwrap().is_empty());

    let history = ledger.list_transactions(Some("bitcoin")).unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].kind, Sell);
    assert_eq!(history[0].total_value, dec!(750));
}

fn invalid_input_writes_nothing<S: LedgerStore>(ledger: &TransactionLedger<S>) {
    let negative = ledger.record("bitcoin", "BTC", Buy, dec!(-1), dec!(100));
    let free = ledger.record("bitcoin", "BTC", Buy, dec!(1), dec!(0));
    let anonymous = ledger.record("", "BTC", Buy, dec!(1), dec!(100));

    for result in [negative, free, anonymous] {
        assert!(matches!(result, Err(LedgerError::InvalidTransaction(_))));
    }
    assert!(ledger.list_transactions(None).unwrap().is_empty());
    assert!(ledger.list_holdings().unwrap().is_empty());
}

#[test]
fn test_weighted_average_lifecycle_memory() {
    buy_buy_sell_sell(&TransactionLedger::new(MemoryStore::new()));
}

#[test]
fn test_weighted_average_lifecycle_sqlite() {
    let dir = TempDir::new().unwrap();
    buy_buy_sell_sell(&sqlite_ledger(&dir));
}

#[test]
fn test_invalid_input_memory() {
    invalid_input_writes_nothing(&TransactionLedger::new(MemoryStore::new()));
}

#[test]
fn test_invalid_input_sqlite() {
    let dir = TempDir::new().unwrap();
    invalid_input_writes_nothing(&sqlite_ledger(&dir));
}

fn overflow_is_rejected_and_store_stays_usable<S: LedgerStore>(ledger: &TransactionLedger<S>) {
    let whale = Decimal::from_scientific("5e28").unwrap();
    ledger.record("bitcoin", "BTC", Buy, whale, dec!(1)).unwrap();

    let err = ledger.record("bitcoin", "BTC", Buy, whale, dec!(1)).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransaction(_)));

    let huge = Decimal::from(10_000_000_000_000_000_u64);
    let err = ledger.record("ethereum", "ETH", Buy, huge, huge).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransaction(_)));

    // the failed units left nothing behind and the store still accepts work
    assert_eq!(ledger.holding("bitcoin").unwrap().unwrap().amount, whale);
    assert_eq!(ledger.list_transactions(None).unwrap().len(), 1);
    ledger.record("ethereum", "ETH", Buy, dec!(1), dec!(1)).unwrap();
    assert_eq!(ledger.list_holdings().unwrap().len(), 2);
}

#[test]
fn test_overflow_rejected_memory() {
    overflow_is_rejected_and_store_stays_usable(&TransactionLedger::new(MemoryStore::new()));
}

#[test]
fn test_overflow_rejected_sqlite() {
    let dir = TempDir::new().unwrap();
    overflow_is_rejected_and_store_stays_usable(&sqlite_ledger(&dir));
}

#[test]
fn test_oversell_closes_position() {
    let ledger = TransactionLedger::new(MemoryStore::new());
    ledger.record("solana", "SOL", Buy, dec!(50), dec!(85)).unwrap();
    ledger.record("solana", "SOL", Sell, dec!(80), dec!(190)).unwrap();

    assert!(ledger.holding("solana").unwrap().is_none());
    assert_eq!(ledger.list_transactions(Some("solana")).unwrap().len(), 2);

    // a fresh buy starts a new average
    ledger.record("solana", "SOL", Buy, dec!(10), dec!(150)).unwrap();
    let holding = ledger.holding("solana").unwrap().unwrap();
    assert_eq!(holding.amount, dec!(10));
    assert_eq!(holding.average_buy_price, dec!(150));
}

#[test]
fn test_strict_policy_rejects_without_writing() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(dir.path().join("strict.db")).unwrap();
    let config = LedgerConfig::default().with_sell_policy(SellPolicy::Strict);
    let ledger = TransactionLedger::with_config(store, config);

    let err = ledger.record("ethereum", "ETH", Sell, dec!(1), dec!(3500)).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransaction(_)));

    ledger.record("ethereum", "ETH", Buy, dec!(5), dec!(2800)).unwrap();
    let err = ledger.record("ethereum", "ETH", Sell, dec!(6), dec!(3500)).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransaction(_)));

    assert_eq!(ledger.list_transactions(None).unwrap().len(), 1);
    assert_eq!(ledger.holding("ethereum").unwrap().unwrap().amount, dec!(5));
}

#[test]
fn test_repeated_reads_are_identical() {
    let dir = TempDir::new().unwrap();
    let ledger = sqlite_ledger(&dir);
    ledger.record("bitcoin", "BTC", Buy, dec!(0.1), dec!(45000)).unwrap();
    ledger.record("cardano", "ADA", Buy, dec!(1000), dec!(1.20)).unwrap();
    ledger.record("ethereum", "ETH", Buy, dec!(5), dec!(2800)).unwrap();

    let first = ledger.list_holdings().unwrap();
    let second = ledger.list_holdings().unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].coin_id, "ethereum");
}

/// Store whose holding writes always fail, after the transaction append succeeded
struct FaultyStore {
    inner: MemoryStore,
}

struct FaultyWrite<'a> {
    inner: &'a mut dyn LedgerWrite,
}

impl LedgerWrite for FaultyWrite<'_> {
    fn holding(&mut self, coin_id: &str) -> Result<Option<Holding>> {
        self.inner.holding(coin_id)
    }

    fn append_transaction(&mut self, tx: portfolio_ledger::model::NewTransaction) -> Result<Transaction> {
        self.inner.append_transaction(tx)
    }

    fn put_holding(&mut self, _holding: &Holding) -> Result<()> {
        Err(LedgerError::StorageFailure("disk full".into()))
    }

    fn delete_holding(&mut self, _coin_id: &str) -> Result<()> {
        Err(LedgerError::StorageFailure("disk full".into()))
    }
}

impl LedgerStore for FaultyStore {
    fn write<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn LedgerWrite) -> Result<R>,
    {
        self.inner.write(|unit| f(&mut FaultyWrite { inner: unit }))
    }

    fn holdings(&self) -> Result<Vec<Holding>> {
        self.inner.holdings()
    }

    fn transactions(&self, coin_id: Option<&str>) -> Result<Vec<Transaction>> {
        self.inner.transactions(coin_id)
    }
}

#[test]
fn test_storage_fault_leaves_no_partial_write() {
    let ledger = TransactionLedger::new(FaultyStore {
        inner: MemoryStore::new(),
    });

    let err = ledger.record("bitcoin", "BTC", Buy, dec!(1), dec!(100)).unwrap_err();

    assert!(err.is_storage_failure());
    assert!(ledger.list_transactions(None).unwrap().is_empty());
    assert!(ledger.list_holdings().unwrap().is_empty());
}

fn concurrent_buys<S: LedgerStore>(ledger: &TransactionLedger<S>, prices: &[Decimal]) {
    std::thread::scope(|scope| {
        for &price in prices {
            scope.spawn(move || {
                ledger.record("bitcoin", "BTC", Buy, dec!(1.0), price).unwrap();
            });
        }
    });

    let n = Decimal::from(prices.len());
    let expected_total: Decimal = prices.iter().sum();
    let holding = ledger.holding("bitcoin").unwrap().unwrap();

    // Every serial order of equal-sized buys blends to the plain mean
    assert_eq!(holding.amount, n);
    let drift = (holding.amount * holding.average_buy_price - expected_total).abs();
    assert!(drift < dec!(0.000000001), "average drifted by {}", drift);
    assert_eq!(ledger.list_transactions(None).unwrap().len(), prices.len());
}

#[test]
fn test_concurrent_buys_serialize_memory() {
    for round in 0..20u32 {
        let prices: Vec<Decimal> = (0..8u32)
            .map(|i| Decimal::from(100 + 7 * i + round) + dec!(0.33))
            .collect();
        concurrent_buys(&TransactionLedger::new(MemoryStore::new()), &prices);
    }
}

#[test]
fn test_concurrent_buys_serialize_sqlite() {
    for round in 0..5u32 {
        let dir = TempDir::new().unwrap();
        let prices: Vec<Decimal> = (0..8u32)
            .map(|i| Decimal::from(1000 + 13 * i + round))
            .collect();
        concurrent_buys(&sqlite_ledger(&dir), &prices);
    }
}

fn concurrent_history_follows_insertion<S: LedgerStore>(ledger: &TransactionLedger<S>) {
    std::thread::scope(|scope| {
        for coin in ["bitcoin", "ethereum", "solana", "cardano"] {
            scope.spawn(move || {
                for _ in 0..10 {
                    ledger.record(coin, coin, Buy, dec!(1), dec!(10)).unwrap();
                }
            });
        }
    });

    let history = ledger.list_transactions(None).unwrap();
    assert_eq!(history.len(), 40);
    assert!(history.windows(2).all(|w| w[0].id > w[1].id));
}

#[test]
fn test_concurrent_history_order_memory() {
    concurrent_history_follows_insertion(&TransactionLedger::new(MemoryStore::new()));
}

#[test]
fn test_concurrent_history_order_sqlite() {
    let dir = TempDir::new().unwrap();
    concurrent_history_follows_insertion(&sqlite_ledger(&dir));
}

#[tokio::test]
async fn test_valuation_end_to_end() {
    let ledger = TransactionLedger::new(MemoryStore::new());
    ledger.record("bitcoin", "BTC", Buy, dec!(0.1), dec!(45000)).unwrap();
    ledger.record("bitcoin", "BTC", Buy, dec!(0.05), dec!(62000)).unwrap();
    ledger.record("ethereum", "ETH", Buy, dec!(5), dec!(2800)).unwrap();
    ledger.record("ethereum", "ETH", Sell, dec!(1), dec!(3500)).unwrap();
    ledger.record("obscure-coin", "OBS", Buy, dec!(2), dec!(50)).unwrap();

    let holdings = ledger.list_holdings().unwrap();
    let ids: Vec<&str> = holdings.iter().map(|h| h.coin_id.as_str()).collect();

    let feed = StaticPriceFeed::default();
    let prices = feed.current_prices(&ids).await.unwrap();
    assert!(prices.get("obscure-coin").is_none());

    let summary = PortfolioValuator::snapshot(&holdings, &prices);
    let by_coin: HashMap<&str, _> = summary
        .items
        .iter()
        .map(|item| (item.coin_id.as_str(), item))
        .collect();

    let eth = by_coin["ethereum"];
    assert_eq!(eth.amount, dec!(4));
    assert_eq!(eth.current_value, dec!(13800));
    assert_eq!(eth.pnl, dec!(2600));

    let obscure = by_coin["obscure-coin"];
    assert_eq!(obscure.current_price, dec!(50));
    assert_eq!(obscure.pnl, Decimal::ZERO);

    assert_eq!(summary.items[0].coin_id, "ethereum");
    assert_eq!(
        summary.total_value,
        summary.items.iter().map(|i| i.current_value).sum::<Decimal>()
    );
}

#[test]
fn test_valuation_with_missing_and_present_prices() {
    let holding = Holding::new("x", "X", dec!(2), dec!(50));

    let flat = PortfolioValuator::summarize(std::slice::from_ref(&holding), &PriceMap::new());
    assert_eq!(flat[0].current_price, dec!(50));
    assert_eq!(flat[0].pnl, Decimal::ZERO);
    assert_eq!(flat[0].pnl_percent, Decimal::ZERO);

    let mut prices = PriceMap::new();
    prices.insert("x", dec!(80));
    let up = PortfolioValuator::summarize(&[holding], &prices);
    assert_eq!(up[0].current_value, dec!(160));
    assert_eq!(up[0].pnl, dec!(60));
    assert_eq!(up[0].pnl_percent, dec!(60.0));
}
