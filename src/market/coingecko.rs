//! CoinGecko implementation of [`MarketData`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::http::HttpClient;

use super::{ChartPoint, Crypto, MarketData, SearchCoin, Timeframe};

pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API response types (internal).
mod api {
    use serde::Deserialize;

    use crate::market::SearchCoin;

    #[derive(Deserialize, Debug)]
    pub struct MarketChart {
        #[serde(default)]
        pub prices: Vec<(f64, f64)>,
    }

    #[derive(Deserialize, Debug)]
    pub struct SearchResult {
        #[serde(default)]
        pub coins: Vec<SearchCoin>,
    }
}

pub struct CoinGecko {
    http_client: HttpClient,
    api_url: String,
}

impl CoinGecko {
    /// Create a client for the public API.
    pub fn new(client: Client) -> Self {
        Self::with_api_url(client, DEFAULT_API_URL)
    }

    pub fn with_api_url(client: Client, api_url: &str) -> Self {
        Self::from_http_client(HttpClient::new(client), api_url)
    }

    pub fn from_http_client(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl MarketData for CoinGecko {
    #[tracing::instrument(skip(self))]
    async fn list(&self, limit: u32, page: u32) -> Result<Vec<Crypto>> {
        let url = format!("{}/coins/markets", self.api_url);
        let per_page = limit.to_string();
        let page = page.to_string();
        debug!("Fetching market list page {} ({} per page)...", page, per_page);

        self.http_client
            .get_json(
                &url,
                &[
                    ("vs_currency", "usd"),
                    ("order", "market_cap_desc"),
                    ("per_page", per_page.as_str()),
                    ("page", page.as_str()),
                    ("sparkline", "true"),
                    ("price_change_percentage", "24h"),
                ],
            )
            .await
            .context("Failed to fetch cryptocurrency data")
    }

    #[tracing::instrument(skip(self))]
    async fn by_ids(&self, ids: &[String]) -> Result<Vec<Crypto>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/coins/markets", self.api_url);
        let ids = ids.join(",");
        debug!("Fetching details for {}...", ids);

        self.http_client
            .get_json(
                &url,
                &[("vs_currency", "usd"), ("ids", ids.as_str()), ("sparkline", "true")],
            )
            .await
            .context("Failed to fetch cryptocurrency details")
    }

    #[tracing::instrument(skip(self))]
    async fn chart(&self, id: &str, timeframe: Timeframe) -> Result<Vec<ChartPoint>> {
        let url = format!("{}/coins/{}/market_chart", self.api_url, id);
        let days = timeframe.to_string();
        debug!("Fetching {} day chart for {}...", days, id);

        let chart: api::MarketChart = self
            .http_client
            .get_json(&url, &[("vs_currency", "usd"), ("days", days.as_str())])
            .await
            .context("Failed to fetch chart data")?;

        Ok(chart
            .prices
            .into_iter()
            .map(|(timestamp, price)| ChartPoint::new(timestamp as i64, price))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchCoin>> {
        let url = format!("{}/search", self.api_url);

        let result: api::SearchResult = self
            .http_client
            .get_json(&url, &[("query", query)])
            .await
            .context("Failed to search cryptocurrencies")?;

        Ok(result.coins)
    }
}
