use std::collections::HashMap;

use super::Holding;
use crate::market::Crypto;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitLoss {
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortfolioValue {
    pub total_value: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionEntry {
    /// Upper-cased symbol
    pub name: String,
    pub value: f64,
    pub percentage: f64,
}

/// Profit or loss of `amount` units bought at `purchase_price`.
/// The percentage is 0 for a zero purchase price.
pub fn profit_loss(current_price: f64, purchase_price: f64, amount: f64) -> ProfitLoss {
    let percentage = if purchase_price == 0.0 {
        0.0
    } else {
        (current_price - purchase_price) / purchase_price * 100.0
    };

    ProfitLoss {
        amount: (current_price - purchase_price) * amount,
        percentage,
    }
}

/// Current prices keyed by asset id.
pub fn prices_by_id(cryptos: &[Crypto]) -> HashMap<String, f64> {
    cryptos
        .iter()
        .map(|c| (c.id.clone(), c.current_price))
        .collect()
}

/// Totals across all holdings; assets without a known price are valued at 0.
pub fn portfolio_value(holdings: &[Holding], prices: &HashMap<String, f64>) -> PortfolioValue {
    let (current, purchase) = holdings.iter().fold((0.0, 0.0), |(current, purchase), h| {
        let price = prices.get(&h.crypto_id).copied().unwrap_or(0.0);
        (
            current + price * h.amount,
            purchase + h.purchase_price * h.amount,
        )
    });

    let total_profit_loss = current - purchase;
    let total_profit_loss_percentage = if purchase > 0.0 {
        total_profit_loss / purchase * 100.0
    } else {
        0.0
    };

    PortfolioValue {
        total_value: current,
        total_profit_loss,
        total_profit_loss_percentage,
    }
}

/// Share of the portfolio's current value held in each position.
/// Empty when the portfolio is worth nothing.
pub fn distribution(holdings: &[Holding], prices: &HashMap<String, f64>) -> Vec<DistributionEntry> {
    let total = portfolio_value(holdings, prices).total_value;
    if total == 0.0 {
        return Vec::new();
    }

    holdings
        .iter()
        .map(|h| {
            let value = prices.get(&h.crypto_id).copied().unwrap_or(0.0) * h.amount;
            DistributionEntry {
                name: h.symbol.to_uppercase(),
                value,
                percentage: value / total * 100.0,
            }
        })
        .collect()
}
