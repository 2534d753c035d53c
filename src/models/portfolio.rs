//! Portfolio records owned by the view layer.
//!
//! The price engine only reads the `symbol` of each record (to decide what
//! to refresh) and the quantities of holdings (for valuation).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Symbol;

/// A position in one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub symbol: Symbol,
    pub holdings: Decimal,
    pub avg_buy_price: Decimal,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A recorded buy or sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    #[serde(alias = "coin")]
    pub symbol: Symbol,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub amount: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub date: Option<String>,
}

/// An asset the user follows without holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: String,
    pub symbol: Symbol,
}
