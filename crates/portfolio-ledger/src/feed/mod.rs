//! Price Feed Integration
//!
//! Typed boundary for the market-data collaborator. The ledger itself never
//! talks to a feed; callers fetch a `PriceMap` and hand it to the valuator.

mod fixed;

pub use fixed::StaticPriceFeed;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::PriceMap;

/// Price feed trait (Strategy pattern)
///
/// Implement this for each market-data provider.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Current USD prices for the given coin ids
    ///
    /// The result may be partial: unknown or stale coins are simply absent.
    async fn current_prices(&self, coin_ids: &[&str]) -> Result<PriceMap>;

    /// Feed name
    fn name(&self) -> &str;
}
