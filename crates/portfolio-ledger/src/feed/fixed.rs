//! Static Price Feed
//!
//! For testing and demo purposes. Returns fixed prices keyed by coin id.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::PriceFeed;
use crate::error::Result;
use crate::model::PriceMap;

/// Price feed serving a fixed table
#[derive(Clone, Debug)]
pub struct StaticPriceFeed {
    prices: HashMap<String, Decimal>,
}

impl Default for StaticPriceFeed {
    /// Seeded with realistic prices for the demo portfolio
    fn default() -> Self {
        Self::empty()
            .with_price("bitcoin", dec!(97500))
            .with_price("ethereum", dec!(3450))
            .with_price("solana", dec!(195))
            .with_price("cardano", dec!(0.95))
            .with_price("dogecoin", dec!(0.38))
            .with_price("polkadot", dec!(7.20))
            .with_price("chainlink", dec!(24.50))
            .with_price("avalanche-2", dec!(42.00))
            .with_price("ripple", dec!(2.35))
    }
}

impl StaticPriceFeed {
    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    pub fn with_price(mut self, coin_id: impl Into<String>, price: Decimal) -> Self {
        self.prices.insert(coin_id.into(), price);
        self
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn current_prices(&self, coin_ids: &[&str]) -> Result<PriceMap> {
        Ok(coin_ids
            .iter()
            .filter_map(|id| self.prices.get(*id).map(|price| ((*id).to_string(), *price)))
            .collect())
    }

    fn name(&self) -> &str {
        "StaticFeed"
    }
}
