//! Shared models for prices, alerts, and portfolio records.
//!
//! Contains the canonical [`Symbol`] key, the immutable
//! [`PriceObservation`] produced by every price source, and the
//! [`PriceSource`] tag that records where an observation came from.

pub mod alert;
pub mod portfolio;

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prices keyed by canonical symbol, as produced by one refresh cycle.
pub type PriceMap = HashMap<Symbol, PriceObservation>;

/// Case-insensitive asset identifier, stored in lower case.
///
/// The primary provider keys assets by this identifier (`"bitcoin"`);
/// the secondary provider derives an exchange ticker from it with
/// [`Symbol::ticker`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Canonicalizes `raw` (trimmed, lower case).
    ///
    /// Blank input yields an empty symbol; use [`Symbol::parse`] at input
    /// boundaries to reject it instead.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Canonicalizes `raw`, returning `None` when nothing is left after
    /// trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let symbol = Self::new(raw);
        (!symbol.0.is_empty()).then_some(symbol)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exchange-style ticker: upper case plus the quote-currency suffix
    /// (`"btc"` + `"USDT"` → `"BTCUSDT"`).
    pub fn ticker(&self, quote_currency: &str) -> String {
        format!("{}{}", self.0.to_uppercase(), quote_currency.to_uppercase())
    }
}

impl From<String> for Symbol {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a [`PriceObservation`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Served from a fresh cache entry without network access.
    Cache,
    /// Primary market-data provider.
    Primary,
    /// Secondary exchange-ticker provider.
    Secondary,
    /// Locally generated fallback.
    Synthetic,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Cache => "cache",
            PriceSource::Primary => "primary",
            PriceSource::Secondary => "secondary",
            PriceSource::Synthetic => "synthetic",
        }
    }

    /// Returns `true` for data that did not come from a live provider.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, PriceSource::Synthetic)
    }
}

/// One observed market price for a symbol.
///
/// Observations are never mutated after creation; a newer observation for
/// the same symbol replaces the old one in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub symbol: Symbol,
    /// Price in USD.
    pub price: Decimal,
    /// 24-hour change in percent.
    pub change_24h: Decimal,
    pub observed_at: DateTime<Utc>,
    pub source: PriceSource,
}

impl PriceObservation {
    /// Creates an observation stamped with the current time.
    pub fn new(symbol: Symbol, price: Decimal, change_24h: Decimal, source: PriceSource) -> Self {
        Self::observed_at(symbol, price, change_24h, source, Utc::now())
    }

    /// Creates an observation with an explicit timestamp.
    pub fn observed_at(
        symbol: Symbol,
        price: Decimal,
        change_24h: Decimal,
        source: PriceSource,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            price,
            change_24h,
            observed_at,
            source,
        }
    }

    /// Returns a copy carrying a different source tag.
    #[must_use]
    pub fn with_source(&self, source: PriceSource) -> Self {
        Self {
            source,
            ..self.clone()
        }
    }
}
