//! Ordered price resolution with graceful degradation.
//!
//! [`SourceChain::resolve`] tries, in order: a fresh cache entry, every
//! configured live provider, and finally the synthetic generator. The
//! first success wins and, unless it came from the cache, is written back
//! to the cache before being returned.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::cache::SharedCache;
use crate::models::{PriceObservation, PriceSource, Symbol};
use crate::providers::{PriceProvider, SyntheticSource};

pub struct SourceChain {
    cache: SharedCache,
    providers: Vec<Arc<dyn PriceProvider>>,
    synthetic: SyntheticSource,
}

impl SourceChain {
    /// Creates a chain over `providers`, tried in the given order.
    pub fn new(
        cache: SharedCache,
        providers: Vec<Arc<dyn PriceProvider>>,
        synthetic: SyntheticSource,
    ) -> Self {
        Self {
            cache,
            providers,
            synthetic,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Resolves a price for `symbol`. Always returns an observation with a
    /// non-negative price.
    ///
    /// A cache hit is returned tagged [`PriceSource::Cache`]; the stored
    /// entry keeps its original tag.
    pub async fn resolve(&self, symbol: &Symbol) -> PriceObservation {
        if let Some(hit) = self.cache.read().await.get(symbol) {
            debug!(%symbol, stored_source = hit.source.as_str(), "price served from cache");
            return hit.with_source(PriceSource::Cache);
        }

        for provider in &self.providers {
            match provider.fetch_price(symbol).await {
                Ok(observation) if observation.price >= Decimal::ZERO => {
                    debug!(%symbol, source = provider.source().as_str(), price = %observation.price, "price resolved");
                    return self.store(symbol, observation).await;
                }
                Ok(observation) => {
                    warn!(%symbol, source = provider.source().as_str(), price = %observation.price, "discarding negative price");
                }
                Err(e) => {
                    warn!(%symbol, source = provider.source().as_str(), "price provider failed: {e}");
                }
            }
        }

        let observation = self.synthetic.generate(symbol);
        warn!(%symbol, price = %observation.price, "all providers failed, using synthetic price");
        self.store(symbol, observation).await
    }

    async fn store(&self, symbol: &Symbol, observation: PriceObservation) -> PriceObservation {
        self.cache
            .write()
            .await
            .put(symbol.clone(), observation.clone());
        observation
    }
}
