//! Periodic and on-demand refresh cycles.
//!
//! The scheduler is either idle or refreshing. A refresh requested while a
//! cycle is in flight is coalesced: it returns immediately and relies on
//! the in-flight cycle's result.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::batch::BatchFetcher;
use crate::config::DEFAULT_REFRESH_INTERVAL;
use crate::models::{PriceMap, Symbol};

/// Callbacks the scheduler drives once per cycle.
#[async_trait]
pub trait RefreshHooks: Send + Sync {
    /// Symbols that need prices this cycle.
    fn symbols(&self) -> BTreeSet<Symbol>;

    /// Called exactly once after each completed cycle, with that cycle's
    /// prices. No other cycle starts before this returns.
    async fn on_refresh_complete(&self, prices: &PriceMap);
}

/// What a call to [`RefreshScheduler::refresh_now`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A cycle ran and fetched this many prices.
    Completed { symbols: usize },
    /// Nothing to refresh; no network access happened.
    Skipped,
    /// Another cycle was already running.
    Coalesced,
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct RefreshScheduler {
    fetcher: Arc<BatchFetcher>,
    interval: Duration,
    refreshing: AtomicBool,
}

/// Returns the scheduler to idle when dropped, even if the cycle panics.
struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RefreshScheduler {
    pub fn new(fetcher: Arc<BatchFetcher>) -> Self {
        Self::with_interval(fetcher, DEFAULT_REFRESH_INTERVAL)
    }

    /// Uses `interval` between periodic cycles. A zero interval is treated
    /// as one millisecond.
    pub fn with_interval(fetcher: Arc<BatchFetcher>, interval: Duration) -> Self {
        Self {
            fetcher,
            interval: interval.max(MIN_INTERVAL),
            refreshing: AtomicBool::new(false),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` while a cycle is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Runs one refresh cycle unless one is already in flight.
    pub async fn refresh_now(&self, hooks: &dyn RefreshHooks) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh already in flight, coalescing");
            return RefreshOutcome::Coalesced;
        }
        let _guard = CycleGuard(&self.refreshing);

        let symbols = hooks.symbols();
        if symbols.is_empty() {
            debug!("no symbols to refresh");
            return RefreshOutcome::Skipped;
        }

        let prices = self.fetcher.fetch_all(symbols).await;
        let count = prices.len();
        hooks.on_refresh_complete(&prices).await;
        info!(symbols = count, "refresh cycle complete");

        RefreshOutcome::Completed { symbols: count }
    }

    /// Refreshes immediately, then every `interval`, forever.
    ///
    /// A tick that arrives while a cycle is still running is coalesced by
    /// [`refresh_now`](Self::refresh_now); missed ticks are not replayed.
    pub async fn run(&self, hooks: &dyn RefreshHooks) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_ms = self.interval.as_millis() as u64, "starting price refresh loop");

        loop {
            ticker.tick().await;
            self.refresh_now(hooks).await;
        }
    }
}
