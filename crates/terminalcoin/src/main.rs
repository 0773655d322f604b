//! TerminalCoin portfolio command
//!
//! ```text
//! terminalcoin [summary]          value holdings against current prices
//! terminalcoin seed               record the example portfolio
//! terminalcoin history [coin_id]  print the transaction history
//! ```
//!
//! Configuration comes from the environment (or `.env`):
//! `TERMINALCOIN_DB_PATH`, `TERMINALCOIN_SELL_POLICY`, `RUST_LOG`.

mod seed;

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_ledger::{
    report, LedgerConfig, LedgerError, PortfolioValuator, PriceFeed, PriceMap, SqliteStore,
    StaticPriceFeed, TransactionLedger,
};

enum Command {
    Summary,
    Seed,
    History(Option<String>),
}

impl Command {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        match args.next().as_deref() {
            None | Some("summary") => Ok(Command::Summary),
            Some("seed") => Ok(Command::Seed),
            Some("history") => Ok(Command::History(args.next())),
            Some(other) => anyhow::bail!(
                "unknown command '{}' (expected summary, seed or history)",
                other
            ),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Ledger errors get the short dashboard wording
            match err.downcast_ref::<LedgerError>() {
                Some(ledger_err) => eprintln!("⚠ {}", ledger_err.user_message()),
                None => eprintln!("⚠ {}", err),
            }
            tracing::debug!("{:?}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let command = Command::parse(std::env::args().skip(1))?;
    let config = LedgerConfig::from_env()?;

    let store = SqliteStore::open(&config.database_path)?;
    store.health_check()?;
    tracing::info!("Using ledger database {}", store.path().display());
    let ledger = TransactionLedger::with_config(store, config);

    match command {
        Command::Seed => {
            let count = seed::seed_portfolio(&ledger)?;
            println!("Recorded {} example transactions.", count);
            println!("Run 'terminalcoin summary' to see the portfolio.");
        }
        Command::History(coin_id) => {
            let transactions = ledger.list_transactions(coin_id.as_deref())?;
            print!("{}", report::render_history(&transactions));
        }
        Command::Summary => {
            let holdings = ledger.list_holdings()?;
            let coin_ids: Vec<&str> = holdings.iter().map(|h| h.coin_id.as_str()).collect();

            let prices = fetch_prices(&StaticPriceFeed::default(), &coin_ids).await;
            let summary = PortfolioValuator::snapshot(&holdings, &prices);
            print!("{}", report::render_summary(&summary));
        }
    }

    Ok(())
}

/// Current prices, or an empty map (everything valued at cost) when the feed fails
async fn fetch_prices(feed: &dyn PriceFeed, coin_ids: &[&str]) -> PriceMap {
    match feed.current_prices(coin_ids).await {
        Ok(prices) => {
            tracing::info!("{} returned {} of {} prices", feed.name(), prices.len(), coin_ids.len());
            prices
        }
        Err(e) => {
            tracing::warn!("{} unavailable, valuing at cost: {}", feed.name(), e);
            eprintln!("⚠ {}", e.user_message());
            PriceMap::new()
        }
    }
}
