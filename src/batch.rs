//! Rate-limited bulk price refresh.
//!
//! [`BatchFetcher::fetch_all`] splits the requested symbols into groups,
//! asks the bulk provider for each group in one request, and resolves any
//! symbol missing from the bulk answer individually through the
//! [`SourceChain`]. Groups run strictly one after another with a pause in
//! between; fallbacks inside a group run concurrently.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::chain::SourceChain;
use crate::config::{DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};
use crate::models::{PriceMap, Symbol};
use crate::providers::BulkPriceProvider;

pub struct BatchFetcher {
    chain: Arc<SourceChain>,
    bulk: Arc<dyn BulkPriceProvider>,
    batch_size: usize,
    batch_delay: Duration,
}

impl BatchFetcher {
    /// Creates a fetcher with groups of 10 and a 100 ms pause.
    pub fn new(chain: Arc<SourceChain>, bulk: Arc<dyn BulkPriceProvider>) -> Self {
        Self {
            chain,
            bulk,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    /// Overrides group size and inter-group pause. A size of zero is
    /// treated as one.
    #[must_use]
    pub fn with_pacing(mut self, batch_size: usize, batch_delay: Duration) -> Self {
        self.batch_size = batch_size.max(1);
        self.batch_delay = batch_delay;
        self
    }

    pub fn chain(&self) -> &Arc<SourceChain> {
        &self.chain
    }

    /// Fetches a price for every distinct symbol in `symbols`.
    ///
    /// The returned map has exactly one entry per distinct symbol; symbols
    /// no live provider knows come back synthetic.
    pub async fn fetch_all<I>(&self, symbols: I) -> PriceMap
    where
        I: IntoIterator<Item = Symbol>,
    {
        let symbols = dedup(symbols);
        let groups = partition(&symbols, self.batch_size);
        let mut prices = PriceMap::with_capacity(symbols.len());

        info!(
            symbols = symbols.len(),
            groups = groups.len(),
            "fetching prices"
        );

        for (index, group) in groups.iter().enumerate() {
            self.fetch_group(group, &mut prices).await;

            if index + 1 < groups.len() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        prices
    }

    async fn fetch_group(&self, group: &[Symbol], prices: &mut PriceMap) {
        let mut found = match self.bulk.fetch_prices(group).await {
            Ok(found) => found,
            Err(e) => {
                warn!(group = group.len(), "bulk price request failed: {e}");
                PriceMap::new()
            }
        };
        found.retain(|symbol, observation| {
            group.contains(symbol) && observation.price >= Decimal::ZERO
        });

        {
            let mut cache = self.chain.cache().write().await;
            for (symbol, observation) in &found {
                cache.put(symbol.clone(), observation.clone());
            }
        }

        let missing: Vec<&Symbol> = group
            .iter()
            .filter(|symbol| !found.contains_key(*symbol))
            .collect();
        if !missing.is_empty() {
            debug!(missing = missing.len(), "resolving symbols absent from bulk response");
        }

        let fallbacks = join_all(missing.iter().map(|symbol| self.chain.resolve(symbol))).await;
        for (symbol, observation) in missing.into_iter().zip(fallbacks) {
            found.insert(symbol.clone(), observation);
        }

        prices.extend(found);
    }
}

/// Removes duplicates, keeping first-seen order.
fn dedup<I>(symbols: I) -> Vec<Symbol>
where
    I: IntoIterator<Item = Symbol>,
{
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .filter(|symbol| seen.insert(symbol.clone()))
        .collect()
}

/// Splits `symbols` into consecutive groups of at most `size`.
pub fn partition(symbols: &[Symbol], size: usize) -> Vec<Vec<Symbol>> {
    symbols
        .chunks(size.max(1))
        .map(<[Symbol]>::to_vec)
        .collect()
}
