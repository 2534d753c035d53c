//! Time-bounded cache of the last known price per symbol.
//!
//! Entries are never evicted: a stale entry stays in place until the next
//! successful fetch supersedes it, but [`PriceCache::get`] treats it as
//! absent. The set of symbols is user-driven and small, so memory stays
//! bounded by the number of distinct symbols seen in a session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::config::DEFAULT_CACHE_TTL;
use crate::models::{PriceObservation, Symbol};

/// Cache handle shared by the source chain, the batch fetcher, and the
/// tracker.
///
/// Writers are the chain and the batch fetcher only; both take the write
/// lock for a single `put` and never hold it across a provider call.
pub type SharedCache = Arc<RwLock<PriceCache>>;

#[derive(Debug)]
pub struct PriceCache {
    entries: HashMap<Symbol, PriceObservation>,
    ttl: Duration,
    last_updated: Option<DateTime<Utc>>,
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceCache {
    /// Creates an empty cache with the default 30 second TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            last_updated: None,
        }
    }

    /// Wraps the cache for sharing across components.
    pub fn shared(self) -> SharedCache {
        Arc::new(RwLock::new(self))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored observation if it is still fresh.
    pub fn get(&self, symbol: &Symbol) -> Option<&PriceObservation> {
        self.get_at(symbol, Utc::now())
    }

    /// Same as [`get`](Self::get), evaluated at an explicit instant.
    pub fn get_at(&self, symbol: &Symbol, now: DateTime<Utc>) -> Option<&PriceObservation> {
        self.entries
            .get(symbol)
            .filter(|observation| self.is_fresh(observation, now))
    }

    /// Stores `observation`, replacing any previous entry for `symbol`.
    pub fn put(&mut self, symbol: Symbol, observation: PriceObservation) {
        self.last_updated = Some(observation.observed_at);
        self.entries.insert(symbol, observation);
    }

    /// Timestamp of the most recent `put`.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// All stored observations, fresh or stale, ordered by symbol.
    pub fn snapshot(&self) -> Vec<PriceObservation> {
        let mut observations: Vec<_> = self.entries.values().cloned().collect();
        observations.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        observations
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An entry is fresh while `now - observed_at < ttl`. Timestamps ahead
    /// of `now` count as fresh.
    fn is_fresh(&self, observation: &PriceObservation, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(observation.observed_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceSource;
    use chrono::TimeDelta;
    use rust_decimal_macros::dec;

    fn observation(symbol: &str, age_ms: i64, now: DateTime<Utc>) -> PriceObservation {
        PriceObservation::observed_at(
            Symbol::new(symbol),
            dec!(43000),
            dec!(1.5),
            PriceSource::Primary,
            now - TimeDelta::milliseconds(age_ms),
        )
    }

    #[test]
    fn fresh_entry_is_returned() {
        let now = Utc::now();
        let mut cache = PriceCache::new();
        cache.put(Symbol::new("bitcoin"), observation("bitcoin", 1_000, now));

        let hit = cache.get_at(&Symbol::new("bitcoin"), now).unwrap();
        assert_eq!(hit.price, dec!(43000));
    }

    #[test]
    fn stale_entry_is_absent_but_retained() {
        let now = Utc::now();
        let mut cache = PriceCache::new();
        cache.put(Symbol::new("bitcoin"), observation("bitcoin", 31_000, now));

        assert!(cache.get_at(&Symbol::new("bitcoin"), now).is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.snapshot()[0].price, dec!(43000));
    }

    #[test]
    fn entry_exactly_at_ttl_is_stale() {
        let now = Utc::now();
        let mut cache = PriceCache::new();
        cache.put(Symbol::new("bitcoin"), observation("bitcoin", 30_000, now));

        assert!(cache.get_at(&Symbol::new("bitcoin"), now).is_none());
    }

    #[test]
    fn put_overwrites_and_moves_watermark() {
        let now = Utc::now();
        let mut cache = PriceCache::new();
        cache.put(Symbol::new("bitcoin"), observation("bitcoin", 31_000, now));
        let newer = observation("bitcoin", 0, now);
        cache.put(Symbol::new("bitcoin"), newer.clone());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.last_updated(), Some(newer.observed_at));
        assert_eq!(cache.get_at(&Symbol::new("bitcoin"), now), Some(&newer));
    }

    #[test]
    fn unknown_symbol_is_absent() {
        let cache = PriceCache::new();
        assert!(cache.get(&Symbol::new("dogecoin")).is_none());
        assert!(cache.last_updated().is_none());
    }

    #[test]
    fn freshness_holds_for_every_hit() {
        let now = Utc::now();
        let mut cache = PriceCache::with_ttl(Duration::from_millis(30_000));
        for (i, age) in [0, 5_000, 29_999, 30_000, 45_000, 120_000].iter().enumerate() {
            let symbol = format!("coin{i}");
            cache.put(Symbol::new(&symbol), observation(&symbol, *age, now));
        }

        for observation in cache.snapshot() {
            if let Some(hit) = cache.get_at(&observation.symbol, now) {
                let age = now.signed_duration_since(hit.observed_at);
                assert!(age < TimeDelta::milliseconds(30_000));
            }
        }
    }
}
