//! Weighted-average cost accounting

use rust_decimal::Decimal;

/// Blend a new purchase into an existing average cost per unit
///
/// Returns `new_price` when the combined quantity is zero, and `None` when
/// an intermediate value does not fit in a `Decimal`.
pub fn weighted_average(
    existing_amount: Decimal,
    existing_avg: Decimal,
    new_amount: Decimal,
    new_price: Decimal,
) -> Option<Decimal> {
    let total_amount = existing_amount.checked_add(new_amount)?;
    if total_amount == Decimal::ZERO {
        return Some(new_price);
    }

    let existing_cost = existing_amount.checked_mul(existing_avg)?;
    let new_cost = new_amount.checked_mul(new_price)?;
    existing_cost.checked_add(new_cost)?.checked_div(total_amount)
}
