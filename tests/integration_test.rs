//! Live provider integration tests.
//!
//! These tests call the public CoinGecko and Binance APIs and require network access.
//! Run with: `cargo test --features integration-tests`

#![cfg(feature = "integration-tests")]

use std::sync::Arc;

use pricewatch::config::{
    DEFAULT_PRIMARY_URL, DEFAULT_QUOTE_CURRENCY, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SECONDARY_URL,
};
use pricewatch::models::{PriceSource, Symbol};
use pricewatch::providers::{
    BinanceClient, BulkPriceProvider, CoinGeckoClient, PriceProvider, SyntheticSource,
    build_http_client,
};
use pricewatch::{BatchFetcher, PriceCache, SourceChain};
use rust_decimal::Decimal;

fn coingecko() -> CoinGeckoClient {
    let http = build_http_client(DEFAULT_REQUEST_TIMEOUT).expect("Failed to build HTTP client");
    CoinGeckoClient::new(http, DEFAULT_PRIMARY_URL)
}

fn binance() -> BinanceClient {
    let http = build_http_client(DEFAULT_REQUEST_TIMEOUT).expect("Failed to build HTTP client");
    BinanceClient::new(http, DEFAULT_SECONDARY_URL, DEFAULT_QUOTE_CURRENCY)
}

#[tokio::test]
async fn test_coingecko_bulk_prices() {
    let symbols = vec![Symbol::new("bitcoin"), Symbol::new("ethereum")];

    let prices = coingecko()
        .fetch_prices(&symbols)
        .await
        .expect("CoinGecko bulk request failed");

    assert_eq!(prices.len(), 2);
    assert!(prices.values().all(|o| o.price > Decimal::ZERO));
}

#[tokio::test]
async fn test_binance_ticker() {
    let observation = binance()
        .fetch_price(&Symbol::new("btc"))
        .await
        .expect("Binance ticker request failed");

    assert_eq!(observation.source, PriceSource::Secondary);
    assert!(observation.price > Decimal::ZERO);
}

#[tokio::test]
async fn test_fetch_all_against_live_providers() {
    let primary = Arc::new(coingecko());
    let providers: Vec<Arc<dyn PriceProvider>> =
        vec![primary.clone() as Arc<dyn PriceProvider>, Arc::new(binance())];
    let chain = Arc::new(SourceChain::new(
        PriceCache::new().shared(),
        providers,
        SyntheticSource::new(),
    ));
    let fetcher = BatchFetcher::new(chain, primary);

    let prices = fetcher
        .fetch_all(vec![Symbol::new("bitcoin"), Symbol::new("not-a-real-coin-xyz")])
        .await;

    assert_eq!(prices.len(), 2);
    assert_eq!(
        prices[&Symbol::new("not-a-real-coin-xyz")].source,
        PriceSource::Synthetic
    );
}
