//! Text rendering of portfolio valuations and history

use rust_decimal::Decimal;

use crate::model::Transaction;
use crate::valuation::PortfolioSummary;

const RULE_WIDTH: usize = 96;

/// `$1,234.56`, with a leading `-` for negatives
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// `+12.34%`; the sign is shown only for gains
pub fn format_percentage(value: Decimal) -> String {
    let sign = if value > Decimal::ZERO { "+" } else { "" };
    format!("{}{:.2}%", sign, value.round_dp(2))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Holdings table followed by the balance and P&L footer
pub fn render_summary(summary: &PortfolioSummary) -> String {
    let mut output = String::from("My Portfolio\n");
    output.push_str(&"═".repeat(RULE_WIDTH));
    output.push('\n');

    if summary.items.is_empty() {
        output.push_str("No holdings yet. Record a BUY to get started.\n");
    } else {
        output.push_str(&format!(
            "{:<8} {:>14} {:>14} {:>14} {:>14} {:>14} {:>10}\n",
            "Symbol", "Amount", "Avg Price", "Current Price", "Value", "P&L", "P&L %"
        ));

        for item in &summary.items {
            output.push_str(&format!(
                "{:<8} {:>14} {:>14} {:>14} {:>14} {:>14} {:>10}\n",
                item.symbol,
                format!("{:.4}", item.amount),
                format_currency(item.avg_buy_price),
                format_currency(item.current_price),
                format_currency(item.current_value),
                format_currency(item.pnl),
                format_percentage(item.pnl_percent),
            ));
        }
    }

    output.push_str(&"─".repeat(RULE_WIDTH));
    output.push('\n');
    output.push_str(&format!("Total Balance: {}\n", format_currency(summary.total_value)));
    output.push_str(&format!(
        "Total P&L: {} ({})\n",
        format_currency(summary.total_pnl),
        format_percentage(summary.total_pnl_percent)
    ));

    output
}

/// Transaction history, one line per entry in the given order
pub fn render_history(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions recorded.\n".into();
    }

    let mut output = String::new();
    for tx in transactions {
        output.push_str(&format!(
            "{}  {:<4} {:>14} {:<6} @ {:>12} = {:>14}\n",
            tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
            tx.kind,
            format!("{:.4}", tx.amount),
            tx.symbol,
            format_currency(tx.price_per_unit),
            format_currency(tx.total_value),
        ));
    }
    output
}
