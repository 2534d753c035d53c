//! Application configuration loaded from environment variables.
//!
//! Every setting has a default, so an empty environment yields a working
//! configuration pointed at the public CoinGecko and Binance endpoints:
//! - `PRICEWATCH_PRIMARY_URL`: primary market-data API base URL
//! - `PRICEWATCH_SECONDARY_URL`: secondary exchange API base URL
//! - `PRICEWATCH_QUOTE_CURRENCY`: ticker suffix for the secondary provider
//! - `PRICEWATCH_REFRESH_INTERVAL_MS`: period between refresh cycles
//! - `PRICEWATCH_REQUEST_TIMEOUT_MS`: per-request HTTP timeout
//! - `PRICEWATCH_DATA_DIR`: directory for persisted collections

use std::path::PathBuf;
use std::time::Duration;

/// Default primary provider endpoint.
pub const DEFAULT_PRIMARY_URL: &str = "https://api.coingecko.com/api/v3";

/// Default secondary provider endpoint.
pub const DEFAULT_SECONDARY_URL: &str = "https://api.binance.com/api/v3";

/// Default quote-currency suffix appended to exchange tickers.
pub const DEFAULT_QUOTE_CURRENCY: &str = "USDT";

/// Period of the refresh timer.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(30_000);

/// Maximum age at which a cached price is still served.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(30_000);

/// Upper bound on a single provider request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Number of symbols covered by one bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Pause between successive bulk requests.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub providers: ProviderConfig,
    pub refresh: RefreshConfig,
    /// Where collections are persisted; `None` keeps them in memory.
    pub data_dir: Option<PathBuf>,
}

/// Upstream provider settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub primary_url: String,
    pub secondary_url: String,
    pub quote_currency: String,
    pub request_timeout: Duration,
}

/// Refresh cycle and batching settings.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub interval: Duration,
    pub cache_ttl: Duration,
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: ProviderConfig {
                primary_url: DEFAULT_PRIMARY_URL.to_string(),
                secondary_url: DEFAULT_SECONDARY_URL.to_string(),
                quote_currency: DEFAULT_QUOTE_CURRENCY.to_string(),
                request_timeout: DEFAULT_REQUEST_TIMEOUT,
            },
            refresh: RefreshConfig::default(),
            data_dir: None,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            cache_ttl: DEFAULT_CACHE_TTL,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// Unset or empty variables fall back to the defaults above.
///
/// # Errors
///
/// Returns [`PricewatchError::Config`](crate::PricewatchError::Config) if a
/// duration variable is not a positive integer number of milliseconds.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(url) = non_empty_var("PRICEWATCH_PRIMARY_URL") {
        config.providers.primary_url = url;
    }
    if let Some(url) = non_empty_var("PRICEWATCH_SECONDARY_URL") {
        config.providers.secondary_url = url;
    }
    if let Some(quote) = non_empty_var("PRICEWATCH_QUOTE_CURRENCY") {
        config.providers.quote_currency = quote.to_uppercase();
    }
    if let Some(interval) = millis_var("PRICEWATCH_REFRESH_INTERVAL_MS")? {
        config.refresh.interval = interval;
    }
    if let Some(timeout) = millis_var("PRICEWATCH_REQUEST_TIMEOUT_MS")? {
        config.providers.request_timeout = timeout;
    }
    config.data_dir = non_empty_var("PRICEWATCH_DATA_DIR").map(PathBuf::from);

    Ok(config)
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Parses a positive millisecond count from `name`, if set.
fn millis_var(name: &str) -> crate::Result<Option<Duration>> {
    let Some(raw) = non_empty_var(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(crate::PricewatchError::Config(format!(
            "{name} must be greater than zero"
        ))),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(e) => Err(crate::PricewatchError::Config(format!(
            "{name} is not a millisecond count ({raw:?}): {e}"
        ))),
    }
}
