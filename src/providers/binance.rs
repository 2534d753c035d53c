//! Secondary provider (Binance `ticker/24hr`).
//!
//! Queried per symbol with an exchange ticker such as `BTCUSDT`. Prices
//! arrive as numeric strings.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{PriceProvider, check_status};
use crate::models::{PriceObservation, PriceSource, Symbol};
use crate::{PricewatchError, Result};

/// The fields of a 24 hour ticker response the tracker uses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub last_price: String,
    pub price_change_percent: String,
}

pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
    quote_currency: String,
}

impl BinanceClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        quote_currency: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            quote_currency: quote_currency.into(),
        }
    }
}

#[async_trait]
impl PriceProvider for BinanceClient {
    fn source(&self) -> PriceSource {
        PriceSource::Secondary
    }

    async fn fetch_price(&self, symbol: &Symbol) -> Result<PriceObservation> {
        let ticker = symbol.ticker(&self.quote_currency);
        let url = format!("{}/ticker/24hr", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("symbol", ticker.as_str())])
            .send()
            .await?;
        let response = check_status("binance", response)?;
        let body: Ticker24h = response.json().await?;
        observation_from_ticker(symbol, &body)
    }
}

/// Converts a ticker body into an observation.
///
/// # Errors
///
/// Returns [`PricewatchError::Provider`] if either field is not a number.
pub fn observation_from_ticker(symbol: &Symbol, ticker: &Ticker24h) -> Result<PriceObservation> {
    let price = parse_number("lastPrice", &ticker.last_price)?;
    let change = parse_number("priceChangePercent", &ticker.price_change_percent)?;
    Ok(PriceObservation::new(
        symbol.clone(),
        price,
        change,
        PriceSource::Secondary,
    ))
}

fn parse_number(field: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|e| PricewatchError::Provider(format!("binance {field} {raw:?} is not numeric: {e}")))
}
