//! Upstream price providers.
//!
//! Every live provider implements [`PriceProvider`]; a provider that can
//! answer for many symbols in one request also implements
//! [`BulkPriceProvider`]. The synthetic generator is not a provider: it
//! cannot fail, so it is called directly as the last link of the
//! [`SourceChain`](crate::chain::SourceChain).

pub mod binance;
pub mod coingecko;
pub mod synthetic;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::models::{PriceObservation, PriceSource, Symbol};
use crate::{PricewatchError, Result};

pub use binance::BinanceClient;
pub use coingecko::CoinGeckoClient;
pub use synthetic::SyntheticSource;

/// A market-data source queried one symbol at a time.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Tag attached to observations produced by this provider.
    fn source(&self) -> PriceSource;

    /// Fetches the current price for `symbol`.
    ///
    /// # Errors
    ///
    /// Any transport failure, non-2xx status, or unusable payload.
    async fn fetch_price(&self, symbol: &Symbol) -> Result<PriceObservation>;
}

/// A provider that can resolve several symbols with a single request.
#[async_trait]
pub trait BulkPriceProvider: PriceProvider {
    /// Fetches prices for `symbols`. Symbols the provider does not know are
    /// simply missing from the returned map.
    ///
    /// # Errors
    ///
    /// Any failure of the request as a whole.
    async fn fetch_prices(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, PriceObservation>>;
}

/// Builds the HTTP client shared by the live providers.
///
/// # Errors
///
/// Returns [`PricewatchError::Http`] if the TLS backend cannot be
/// initialized.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pricewatch/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Maps a non-2xx response to a provider error.
fn check_status(provider: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(PricewatchError::Provider(format!(
            "{provider} returned HTTP {status}"
        )))
    }
}
