//! Portfolio Valuation
//!
//! Pure transform from holdings and a price snapshot into per-asset P&L
//! and portfolio totals. Never fails: a coin without a live quote is valued
//! at its average buy price, so it shows zero P&L instead of a false swing.
//! Values beyond the `Decimal` range saturate rather than panic.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{Holding, PortfolioItem, PriceMap};

/// Valued holdings plus aggregate totals
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub items: Vec<PortfolioItem>,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_pnl: Decimal,
    pub total_pnl_percent: Decimal,
}

/// Stateless valuation functions
pub struct PortfolioValuator;

impl PortfolioValuator {
    /// Value each holding, preserving input order
    pub fn summarize(holdings: &[Holding], prices: &PriceMap) -> Vec<PortfolioItem> {
        holdings
            .iter()
            .map(|holding| Self::value(holding, prices))
            .collect()
    }

    fn value(holding: &Holding, prices: &PriceMap) -> PortfolioItem {
        let current_price = prices
            .get(&holding.coin_id)
            .unwrap_or(holding.average_buy_price);

        let current_value = holding.amount.saturating_mul(current_price);
        let cost_basis = holding.cost_basis();
        let pnl = current_value.saturating_sub(cost_basis);

        PortfolioItem {
            coin_id: holding.coin_id.clone(),
            symbol: holding.symbol.clone(),
            amount: holding.amount,
            avg_buy_price: holding.average_buy_price,
            current_price,
            current_value,
            pnl,
            pnl_percent: percent_of(pnl, cost_basis),
        }
    }

    /// Sum of current values
    pub fn total_balance(items: &[PortfolioItem]) -> Decimal {
        saturating_sum(items.iter().map(|item| item.current_value))
    }

    /// Sum of unrealized P&L
    pub fn total_pnl(items: &[PortfolioItem]) -> Decimal {
        saturating_sum(items.iter().map(|item| item.pnl))
    }

    /// Sum of cost bases
    pub fn total_cost(items: &[PortfolioItem]) -> Decimal {
        saturating_sum(items.iter().map(PortfolioItem::cost_basis))
    }

    pub fn snapshot(holdings: &[Holding], prices: &PriceMap) -> PortfolioSummary {
        let items = Self::summarize(holdings, prices);
        let total_value = Self::total_balance(&items);
        let total_cost = Self::total_cost(&items);
        let total_pnl = Self::total_pnl(&items);

        PortfolioSummary {
            total_pnl_percent: percent_of(total_pnl, total_cost),
            items,
            total_value,
            total_cost,
            total_pnl,
        }
    }
}

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole == Decimal::ZERO || part == Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .unwrap_or(if part.is_sign_negative() == whole.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}
