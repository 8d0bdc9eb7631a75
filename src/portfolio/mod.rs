//! Portfolio holdings and price alerts.
//!
//! # Structure
//!
//! - `calc` - Profit/loss, total value and distribution
//! - `alerts` - Trigger evaluation against market prices
//! - `store` - JSON persistence of whole collections under namespace keys

mod alerts;
mod calc;
mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use alerts::check_alerts;
pub use calc::{
    DistributionEntry, PortfolioValue, ProfitLoss, distribution, portfolio_value, prices_by_id,
    profit_loss,
};
pub use store::{ALERTS_KEY, PORTFOLIO_KEY, Store};

/// A position in one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub crypto_id: String,
    pub symbol: String,
    pub name: String,
    pub amount: f64,
    pub purchase_price: f64,
    pub purchase_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertCondition::Above => write!(f, "above"),
            AlertCondition::Below => write!(f, "below"),
        }
    }
}

impl FromStr for AlertCondition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" => Ok(AlertCondition::Above),
            "below" => Ok(AlertCondition::Below),
            _ => anyhow::bail!("Unknown alert condition: {}. Expected above or below.", s),
        }
    }
}

/// A one-shot notification when an asset crosses a target price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub id: String,
    pub crypto_id: String,
    pub symbol: String,
    pub name: String,
    pub target_price: f64,
    pub condition: AlertCondition,
    pub is_active: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<String>,
}

impl PriceAlert {
    /// Whether `price` fires this alert. Inactive or already-triggered alerts never fire.
    pub fn should_trigger(&self, price: f64) -> bool {
        if !self.is_active || self.triggered_at.is_some() {
            return false;
        }
        match self.condition {
            AlertCondition::Above => price >= self.target_price,
            AlertCondition::Below => price <= self.target_price,
        }
    }
}
