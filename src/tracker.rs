//! The tracker ties the price engine to the portfolio records, the alert
//! engine, persistence, and the display.
//!
//! All state is owned here and injected at construction; the view layer
//! talks to a [`Tracker`] handle instead of reaching for globals.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::alerts::AlertEngine;
use crate::batch::BatchFetcher;
use crate::cache::{PriceCache, SharedCache};
use crate::chain::SourceChain;
use crate::config::AppConfig;
use crate::display::{DisplaySink, Notification};
use crate::models::alert::{Alert, Direction, TriggerEvent};
use crate::models::portfolio::{Holding, Trade, WatchlistItem};
use crate::models::{PriceMap, PriceObservation, Symbol};
use crate::providers::{
    BinanceClient, BulkPriceProvider, CoinGeckoClient, PriceProvider, SyntheticSource,
    build_http_client,
};
use crate::scheduler::{RefreshHooks, RefreshOutcome, RefreshScheduler};
use crate::store::{Collection, Store, load_collection, save_collection};
use crate::valuation::{PortfolioMetrics, portfolio_metrics};
use crate::view::{RefreshAction, View};
use crate::{PricewatchError, Result};

/// Portfolio records read by the engine.
#[derive(Debug, Default)]
struct Records {
    holdings: Vec<Holding>,
    trades: Vec<Trade>,
    watchlist: Vec<WatchlistItem>,
}

pub struct Tracker {
    cache: SharedCache,
    fetcher: Arc<BatchFetcher>,
    scheduler: RefreshScheduler,
    store: Arc<dyn Store>,
    display: Arc<dyn DisplaySink>,
    records: Mutex<Records>,
    alerts: Mutex<AlertEngine>,
}

impl Tracker {
    /// Builds a tracker wired to the live CoinGecko and Binance providers.
    ///
    /// # Errors
    ///
    /// Returns [`PricewatchError::Http`] if the HTTP client cannot be built.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn Store>,
        display: Arc<dyn DisplaySink>,
    ) -> Result<Self> {
        let http = build_http_client(config.providers.request_timeout)?;
        let primary = Arc::new(CoinGeckoClient::new(
            http.clone(),
            config.providers.primary_url.clone(),
        ));
        let secondary = Arc::new(BinanceClient::new(
            http,
            config.providers.secondary_url.clone(),
            config.providers.quote_currency.clone(),
        ));

        let cache = PriceCache::with_ttl(config.refresh.cache_ttl).shared();
        let providers = vec![primary.clone() as Arc<dyn PriceProvider>, secondary];
        let chain = Arc::new(SourceChain::new(cache, providers, SyntheticSource::new()));
        let bulk: Arc<dyn BulkPriceProvider> = primary;
        let fetcher = BatchFetcher::new(chain, bulk)
            .with_pacing(config.refresh.batch_size, config.refresh.batch_delay);

        Ok(Self::with_fetcher(
            Arc::new(fetcher),
            config.refresh.interval,
            store,
            display,
        ))
    }

    /// Builds a tracker around an already assembled fetcher.
    pub fn with_fetcher(
        fetcher: Arc<BatchFetcher>,
        refresh_interval: Duration,
        store: Arc<dyn Store>,
        display: Arc<dyn DisplaySink>,
    ) -> Self {
        let cache = fetcher.chain().cache().clone();
        let scheduler = RefreshScheduler::with_interval(fetcher.clone(), refresh_interval);
        Self {
            cache,
            fetcher,
            scheduler,
            store,
            display,
            records: Mutex::new(Records::default()),
            alerts: Mutex::new(AlertEngine::new()),
        }
    }

    /// Loads every collection from the store. Missing or corrupt
    /// collections load as empty.
    pub fn load(&self) {
        let store = self.store.as_ref();
        let records = Records {
            holdings: load_collection(store, Collection::Holdings),
            trades: load_collection(store, Collection::Trades),
            watchlist: load_collection(store, Collection::Watchlist),
        };
        let alerts: Vec<Alert> = load_collection(store, Collection::Alerts);
        let history: Vec<TriggerEvent> = load_collection(store, Collection::TriggeredAlerts);

        info!(
            holdings = records.holdings.len(),
            trades = records.trades.len(),
            watchlist = records.watchlist.len(),
            alerts = alerts.len(),
            triggered = history.len(),
            "loaded tracker state"
        );

        *lock(&self.records) = records;
        *lock(&self.alerts) = AlertEngine::restore(alerts, history);
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Resolves a single price through the source chain.
    ///
    /// # Errors
    ///
    /// Returns [`PricewatchError::InvalidInput`] if `symbol` is blank.
    pub async fn price(&self, symbol: &str) -> Result<PriceObservation> {
        let symbol = Symbol::parse(symbol)
            .ok_or_else(|| PricewatchError::InvalidInput("symbol is empty".to_string()))?;
        Ok(self.fetcher.chain().resolve(&symbol).await)
    }

    /// Validates, stores, and persists a new alert.
    ///
    /// # Errors
    ///
    /// Returns [`PricewatchError::InvalidInput`] for a blank symbol or a
    /// non-positive target. A failed save is reported to the display, not
    /// returned.
    pub fn create_alert(
        &self,
        symbol: &str,
        direction: Direction,
        target_price: Decimal,
    ) -> Result<Alert> {
        let alert = Alert::new(symbol, direction, target_price)?;
        let standing = {
            let mut engine = lock(&self.alerts);
            engine.add(alert.clone());
            engine.standing().to_vec()
        };
        if self.persist(Collection::Alerts, &standing) {
            self.display.notify(Notification::success(format!(
                "Price alert created for {}",
                alert.symbol.as_str().to_uppercase()
            )));
        }
        Ok(alert)
    }

    /// Removes a standing alert.
    pub fn remove_alert(&self, id: &str) -> Option<Alert> {
        let (removed, standing) = {
            let mut engine = lock(&self.alerts);
            let removed = engine.remove(id);
            (removed, engine.standing().to_vec())
        };
        if removed.is_some() && self.persist(Collection::Alerts, &standing) {
            self.display.notify(Notification::success("Alert removed"));
        }
        removed
    }

    /// Standing alerts in insertion order.
    pub fn alerts(&self) -> Vec<Alert> {
        lock(&self.alerts).standing().to_vec()
    }

    /// Every trigger so far, oldest first.
    pub fn triggered_history(&self) -> Vec<TriggerEvent> {
        lock(&self.alerts).history().to_vec()
    }

    /// Replaces the holdings and persists them.
    pub fn set_holdings(&self, holdings: Vec<Holding>) {
        self.persist(Collection::Holdings, &holdings);
        lock(&self.records).holdings = holdings;
    }

    /// Replaces the trade log and persists it.
    pub fn set_trades(&self, trades: Vec<Trade>) {
        self.persist(Collection::Trades, &trades);
        lock(&self.records).trades = trades;
    }

    /// Replaces the watchlist and persists it.
    pub fn set_watchlist(&self, watchlist: Vec<WatchlistItem>) {
        self.persist(Collection::Watchlist, &watchlist);
        lock(&self.records).watchlist = watchlist;
    }

    pub fn trades(&self) -> Vec<Trade> {
        lock(&self.records).trades.clone()
    }

    /// Values the holdings at the cached prices, stale entries included.
    pub async fn metrics(&self) -> PortfolioMetrics {
        let holdings = lock(&self.records).holdings.clone();
        let cache = self.cache.read().await;
        let snapshot = cache.snapshot();
        portfolio_metrics(&holdings, |symbol| {
            snapshot.iter().find(|observation| &observation.symbol == symbol)
        })
    }

    /// Switches to `view`, returning what the view layer should recompute.
    pub fn show(&self, view: View) -> &'static [RefreshAction] {
        debug!(%view, "showing view");
        view.refresh_actions()
    }

    /// Runs one refresh cycle now.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.scheduler.refresh_now(self).await
    }

    /// Refreshes at startup and then periodically, forever.
    pub async fn run(&self) {
        self.scheduler.run(self).await;
    }

    /// Saves a collection, reporting failure to the display. Returns
    /// whether the save succeeded.
    fn persist<T: Serialize + ?Sized>(&self, collection: Collection, value: &T) -> bool {
        match save_collection(self.store.as_ref(), collection, value) {
            Ok(()) => true,
            Err(e) => {
                error!(collection = collection.key(), "failed to save collection: {e}");
                self.display
                    .notify(Notification::error("Failed to save data locally"));
                false
            }
        }
    }
}

#[async_trait]
impl RefreshHooks for Tracker {
    fn symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = BTreeSet::new();
        {
            let records = lock(&self.records);
            symbols.extend(records.holdings.iter().map(|h| h.symbol.clone()));
            symbols.extend(records.watchlist.iter().map(|w| w.symbol.clone()));
        }
        symbols.extend(lock(&self.alerts).standing().iter().map(|a| a.symbol.clone()));
        symbols
    }

    async fn on_refresh_complete(&self, prices: &PriceMap) {
        let (events, changed) = {
            let mut engine = lock(&self.alerts);
            let events = engine.evaluate(prices);
            let changed = (!events.is_empty())
                .then(|| (engine.standing().to_vec(), engine.history().to_vec()));
            (events, changed)
        };

        if let Some((standing, history)) = changed {
            self.persist(Collection::Alerts, &standing);
            self.persist(Collection::TriggeredAlerts, &history);
        }
        for event in &events {
            self.display.notify(Notification::warning(event.describe()));
        }

        let snapshot = self.cache.read().await.snapshot();
        self.display.render(&snapshot, &events);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
