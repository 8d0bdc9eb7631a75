//! Market data for the crypto tracker.
//!
//! This module provides a read-only interface over a market-data API
//! (CoinGecko by default): ranked market lists, single-asset details,
//! historical price series and coin search.

mod coingecko;
pub mod format;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub use coingecko::{CoinGecko, DEFAULT_API_URL};

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Market snapshot for one asset, as returned by `/coins/markets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Crypto {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub market_cap: f64,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub fully_diluted_valuation: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_volume: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub high_24h: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub low_24h: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_change_24h: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_change_percentage_24h: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub market_cap_change_24h: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub market_cap_change_percentage_24h: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub circulating_supply: f64,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ath: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ath_change_percentage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ath_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub atl: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub atl_change_percentage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub atl_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_updated: String,
    #[serde(default)]
    pub sparkline_in_7d: Option<Sparkline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<f64>,
}

/// One point of a historical price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub price: f64,
    /// `YYYY-MM-DD` (UTC)
    pub date: String,
}

impl ChartPoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        let date = chrono::DateTime::from_timestamp_millis(timestamp)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        Self {
            timestamp,
            price,
            date,
        }
    }
}

/// Search hit from `/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
}

/// Chart window in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl Timeframe {
    pub fn days(self) -> u32 {
        match self {
            Timeframe::Day => 1,
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Year => 365,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Timeframe::Day),
            "7" => Ok(Timeframe::Week),
            "30" => Ok(Timeframe::Month),
            "365" => Ok(Timeframe::Year),
            _ => anyhow::bail!("Unknown timeframe: {}. Expected 1, 7, 30, or 365.", s),
        }
    }
}

/// Read-only source of market data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Assets ordered by market cap, `limit` per page, pages start at 1.
    async fn list(&self, limit: u32, page: u32) -> Result<Vec<Crypto>>;

    /// Current snapshots for the given asset ids; unknown ids are simply absent.
    async fn by_ids(&self, ids: &[String]) -> Result<Vec<Crypto>>;

    /// Current snapshot for one asset id, `None` if the id is unknown.
    async fn details(&self, id: &str) -> Result<Option<Crypto>> {
        Ok(self.by_ids(&[id.to_string()]).await?.into_iter().next())
    }

    async fn chart(&self, id: &str, timeframe: Timeframe) -> Result<Vec<ChartPoint>>;

    async fn search(&self, query: &str) -> Result<Vec<SearchCoin>>;
}

/// Keeps assets whose name or symbol contains `query`, ignoring case.
pub fn filter_by_query<'a>(cryptos: &'a [Crypto], query: &str) -> Vec<&'a Crypto> {
    let query = query.trim().to_lowercase();
    cryptos
        .iter()
        .filter(|c| {
            query.is_empty()
                || c.name.to_lowercase().contains(&query)
                || c.symbol.to_lowercase().contains(&query)
        })
        .collect()
}
