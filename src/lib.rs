//! Price acquisition and alert evaluation for a crypto portfolio tracker.
//!
//! Prices come from a fallback chain (fresh cache, CoinGecko, Binance, then
//! a synthetic generator), refreshed in paced batches on a fixed interval.
//! Each completed refresh is evaluated against the standing price alerts.

pub mod alerts;
pub mod batch;
pub mod cache;
pub mod chain;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod providers;
pub mod scheduler;
pub mod store;
pub mod tracker;
pub mod valuation;
pub mod view;

pub use alerts::AlertEngine;
pub use batch::BatchFetcher;
pub use cache::{PriceCache, SharedCache};
pub use chain::SourceChain;
pub use error::{PricewatchError, Result};
pub use scheduler::{RefreshHooks, RefreshOutcome, RefreshScheduler};
pub use tracker::Tracker;
