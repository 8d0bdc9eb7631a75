//! Plain-text rendering of command results.

use std::collections::HashMap;
use std::fmt::Write;

use crate::market::format::{format_compact, format_currency, format_number, format_percentage};
use crate::market::{ChartPoint, Crypto, SearchCoin};
use crate::portfolio::{DistributionEntry, Holding, PortfolioValue, PriceAlert, profit_loss};

pub fn market_table(cryptos: &[&Crypto]) -> String {
    if cryptos.is_empty() {
        return "No cryptocurrencies found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<24} {:<6} {:>16} {:>9} {:>12}",
        "#", "Name", "Symbol", "Price", "24h", "Market Cap"
    );
    for c in cryptos {
        let rank = c
            .market_cap_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>4}  {:<24} {:<6} {:>16} {:>9} {:>12}",
            rank,
            c.name,
            c.symbol.to_uppercase(),
            format_currency(c.current_price),
            format_percentage(c.price_change_percentage_24h),
            format_compact(c.market_cap),
        );
    }
    out
}

pub fn coin_details(c: &Crypto) -> String {
    let optional_supply = |v: Option<f64>| {
        v.map(|v| format_number(v, 0))
            .unwrap_or_else(|| "∞".to_string())
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", c.name, c.symbol.to_uppercase());
    if let Some(rank) = c.market_cap_rank {
        let _ = writeln!(out, "Rank:               #{}", rank);
    }
    let _ = writeln!(
        out,
        "Price:              {} ({})",
        format_currency(c.current_price),
        format_percentage(c.price_change_percentage_24h)
    );
    let _ = writeln!(
        out,
        "24h range:          {} - {}",
        format_currency(c.low_24h),
        format_currency(c.high_24h)
    );
    let _ = writeln!(out, "Market cap:         {}", format_compact(c.market_cap));
    let _ = writeln!(out, "Volume (24h):       {}", format_compact(c.total_volume));
    let _ = writeln!(
        out,
        "Circulating supply: {}",
        format_number(c.circulating_supply, 0)
    );
    let _ = writeln!(out, "Total supply:       {}", optional_supply(c.total_supply));
    let _ = writeln!(out, "Max supply:         {}", optional_supply(c.max_supply));
    let _ = writeln!(
        out,
        "All-time high:      {} ({})",
        format_currency(c.ath),
        format_percentage(c.ath_change_percentage)
    );
    let _ = writeln!(
        out,
        "All-time low:       {} ({})",
        format_currency(c.atl),
        format_percentage(c.atl_change_percentage)
    );
    out
}

pub fn chart(id: &str, points: &[ChartPoint]) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return format!("No chart data for {}.\n", id);
    };

    let mut out = String::new();
    for p in points {
        let _ = writeln!(out, "{}  {:>16}", p.date, format_currency(p.price));
    }

    let change = if first.price == 0.0 {
        0.0
    } else {
        (last.price - first.price) / first.price * 100.0
    };
    let _ = writeln!(
        out,
        "{} points, {} -> {} ({})",
        points.len(),
        format_currency(first.price),
        format_currency(last.price),
        format_percentage(change)
    );
    out
}

pub fn search_results(coins: &[SearchCoin]) -> String {
    if coins.is_empty() {
        return "No matching coins.\n".to_string();
    }

    let mut out = String::new();
    for coin in coins {
        let rank = coin
            .market_cap_rank
            .map(|r| format!("#{}", r))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<24} {:<8} {:<24} {}",
            coin.id,
            coin.symbol.to_uppercase(),
            coin.name,
            rank
        );
    }
    out
}

pub fn portfolio(
    holdings: &[Holding],
    prices: &HashMap<String, f64>,
    value: &PortfolioValue,
    distribution: &[DistributionEntry],
) -> String {
    let mut out = String::new();
    for h in holdings {
        let price = prices.get(&h.crypto_id).copied().unwrap_or(0.0);
        let pl = profit_loss(price, h.purchase_price, h.amount);
        let _ = writeln!(
            out,
            "{:<6} {:>14} @ {:>14}  {:>16}  {} ({})",
            h.symbol.to_uppercase(),
            format_number(h.amount, 4),
            format_currency(price),
            format_currency(price * h.amount),
            format_currency(pl.amount),
            format_percentage(pl.percentage)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Total value: {}", format_currency(value.total_value));
    let _ = writeln!(
        out,
        "Profit/Loss: {} ({})",
        format_currency(value.total_profit_loss),
        format_percentage(value.total_profit_loss_percentage)
    );

    if !distribution.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Distribution:");
        for entry in distribution {
            let _ = writeln!(out, "  {:<6} {:>6.2}%", entry.name, entry.percentage);
        }
    }
    out
}

pub fn alert_line(alert: &PriceAlert) -> String {
    let status = match (&alert.triggered_at, alert.is_active) {
        (Some(at), _) => format!("triggered {}", at),
        (None, true) => "active".to_string(),
        (None, false) => "inactive".to_string(),
    };
    format!(
        "{} {} {} {} [{}]",
        alert.symbol.to_uppercase(),
        alert.condition,
        format_currency(alert.target_price),
        alert.id,
        status
    )
}

pub fn alerts(alerts: &[PriceAlert], fired: &[PriceAlert]) -> String {
    let mut out = String::new();
    for alert in fired {
        let _ = writeln!(out, "TRIGGERED: {}", alert_line(alert));
    }
    if !fired.is_empty() {
        let _ = writeln!(out);
    }
    for alert in alerts {
        let _ = writeln!(out, "{}", alert_line(alert));
    }
    out
}
