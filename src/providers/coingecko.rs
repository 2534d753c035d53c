//! Primary market-data provider (CoinGecko `simple/price`).
//!
//! One request covers any number of comma-joined asset ids; the response
//! maps each known id to its USD price and 24 hour change. Ids the
//! service does not know are absent from the response.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::{BulkPriceProvider, PriceProvider, check_status};
use crate::models::{PriceObservation, PriceSource, Symbol};
use crate::{PricewatchError, Result};

const VS_CURRENCY: &str = "usd";

/// Body of a `simple/price` response.
pub type SimplePriceResponse = HashMap<String, SimplePrice>;

/// Price entry for one asset id.
#[derive(Debug, Deserialize)]
pub struct SimplePrice {
    pub usd: Option<Decimal>,
    #[serde(default)]
    pub usd_24h_change: Option<Decimal>,
}

pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn request(&self, symbols: &[Symbol]) -> Result<SimplePriceResponse> {
        let ids = join_ids(symbols);
        let url = format!("{}/simple/price", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", VS_CURRENCY),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await?;
        let response = check_status("coingecko", response)?;
        let body: SimplePriceResponse = response.json().await?;
        debug!(requested = symbols.len(), returned = body.len(), "coingecko response");
        Ok(body)
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    fn source(&self) -> PriceSource {
        PriceSource::Primary
    }

    async fn fetch_price(&self, symbol: &Symbol) -> Result<PriceObservation> {
        let body = self.request(std::slice::from_ref(symbol)).await?;
        observations_from_response(body, std::slice::from_ref(symbol))
            .remove(symbol)
            .ok_or_else(|| PricewatchError::Provider(format!("coingecko has no price for {symbol}")))
    }
}

#[async_trait]
impl BulkPriceProvider for CoinGeckoClient {
    async fn fetch_prices(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, PriceObservation>> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }
        let body = self.request(symbols).await?;
        Ok(observations_from_response(body, symbols))
    }
}

/// Comma-joined lower-case ids.
pub fn join_ids(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Extracts one observation per requested symbol present in `body`.
///
/// Entries without a `usd` price are skipped; a missing 24 hour change
/// reads as zero.
pub fn observations_from_response(
    mut body: SimplePriceResponse,
    symbols: &[Symbol],
) -> HashMap<Symbol, PriceObservation> {
    symbols
        .iter()
        .filter_map(|symbol| {
            let entry = body.remove(symbol.as_str())?;
            let price = entry.usd?;
            let change = entry.usd_24h_change.unwrap_or(Decimal::ZERO);
            Some((
                symbol.clone(),
                PriceObservation::new(symbol.clone(), price, change, PriceSource::Primary),
            ))
        })
        .collect()
}
