//! Shared test doubles for the engine's collaborator seams.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pricewatch::display::{DisplaySink, Notification, NotificationLevel};
use pricewatch::models::alert::TriggerEvent;
use pricewatch::models::{PriceMap, PriceObservation, PriceSource, Symbol};
use pricewatch::providers::{BulkPriceProvider, PriceProvider, SyntheticSource};
use pricewatch::store::{Collection, Store};
use pricewatch::{BatchFetcher, PriceCache, PricewatchError, RefreshHooks, Result, SourceChain};
use rust_decimal::Decimal;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// Bulk provider answering from a fixed table. Symbols outside the table
/// are omitted from the response.
pub struct MockBulk {
    known: HashMap<Symbol, Decimal>,
    fail: bool,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    group_sizes: Mutex<Vec<usize>>,
}

impl MockBulk {
    pub fn new(known: &[(&str, Decimal)]) -> Self {
        Self {
            known: known
                .iter()
                .map(|(symbol, price)| (Symbol::new(symbol), *price))
                .collect(),
            fail: false,
            gate: None,
            calls: AtomicUsize::new(0),
            group_sizes: Mutex::new(Vec::new()),
        }
    }

    /// Every bulk request fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    /// Bulk requests wait for `gate` to be notified before answering.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        self.group_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceProvider for MockBulk {
    fn source(&self) -> PriceSource {
        PriceSource::Primary
    }

    async fn fetch_price(&self, symbol: &Symbol) -> Result<PriceObservation> {
        Err(PricewatchError::Provider(format!("no single lookup for {symbol}")))
    }
}

#[async_trait]
impl BulkPriceProvider for MockBulk {
    async fn fetch_prices(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, PriceObservation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.group_sizes.lock().unwrap().push(symbols.len());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(PricewatchError::Provider("bulk unavailable".to_string()));
        }
        Ok(symbols
            .iter()
            .filter_map(|symbol| {
                let price = *self.known.get(symbol)?;
                Some((
                    symbol.clone(),
                    PriceObservation::new(symbol.clone(), price, Decimal::ONE, PriceSource::Primary),
                ))
            })
            .collect())
    }
}

/// Single-symbol provider that knows a fixed table and fails otherwise.
pub struct TableProvider {
    known: HashMap<Symbol, Decimal>,
    calls: AtomicUsize,
}

impl TableProvider {
    pub fn new(known: &[(&str, Decimal)]) -> Self {
        Self {
            known: known
                .iter()
                .map(|(symbol, price)| (Symbol::new(symbol), *price))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceProvider for TableProvider {
    fn source(&self) -> PriceSource {
        PriceSource::Secondary
    }

    async fn fetch_price(&self, symbol: &Symbol) -> Result<PriceObservation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.known.get(symbol) {
            Some(price) => Ok(PriceObservation::new(
                symbol.clone(),
                *price,
                Decimal::ZERO,
                PriceSource::Secondary,
            )),
            None => Err(PricewatchError::Provider(format!("unknown symbol {symbol}"))),
        }
    }
}

/// Wires a paced fetcher: `bulk` answers groups, then `bulk` and
/// `secondary` are tried per symbol, then the seeded synthetic source.
pub fn fetcher(
    bulk: Arc<MockBulk>,
    secondary: Arc<TableProvider>,
    batch_delay: Duration,
) -> Arc<BatchFetcher> {
    let cache = PriceCache::new().shared();
    let providers: Vec<Arc<dyn PriceProvider>> = vec![bulk.clone() as Arc<dyn PriceProvider>, secondary];
    let chain = Arc::new(SourceChain::new(cache, providers, SyntheticSource::with_seed(7)));
    let bulk: Arc<dyn BulkPriceProvider> = bulk;
    Arc::new(BatchFetcher::new(chain, bulk).with_pacing(10, batch_delay))
}

pub fn symbols(names: &[&str]) -> Vec<Symbol> {
    names.iter().map(|name| Symbol::new(name)).collect()
}

/// Hooks with a fixed symbol set that count completed cycles.
#[derive(Default)]
pub struct CountingHooks {
    symbols: BTreeSet<Symbol>,
    completions: AtomicUsize,
    last: Mutex<Option<PriceMap>>,
}

impl CountingHooks {
    pub fn new(names: &[&str]) -> Self {
        Self {
            symbols: symbols(names).into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<PriceMap> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl RefreshHooks for CountingHooks {
    fn symbols(&self) -> BTreeSet<Symbol> {
        self.symbols.clone()
    }

    async fn on_refresh_complete(&self, prices: &PriceMap) {
        self.completions.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(prices.clone());
    }
}

/// Display sink that records everything it is given.
#[derive(Default)]
pub struct RecordingDisplay {
    notifications: Mutex<Vec<Notification>>,
    renders: Mutex<Vec<(usize, usize)>>,
}

impl RecordingDisplay {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }

    /// `(prices, events)` counts of every render call.
    pub fn renders(&self) -> Vec<(usize, usize)> {
        self.renders.lock().unwrap().clone()
    }
}

impl DisplaySink for RecordingDisplay {
    fn render(&self, prices: &[PriceObservation], events: &[TriggerEvent]) {
        self.renders.lock().unwrap().push((prices.len(), events.len()));
    }

    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Store whose writes always fail.
#[derive(Default)]
pub struct ReadOnlyStore;

impl Store for ReadOnlyStore {
    fn load(&self, _collection: Collection) -> Result<Option<String>> {
        Ok(None)
    }

    fn save(&self, collection: Collection, _blob: &str) -> Result<()> {
        Err(PricewatchError::Storage(format!(
            "quota exceeded writing {}",
            collection.key()
        )))
    }
}

/// Builds a raw HTTP/1.1 response with a JSON body.
pub fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Serves `reply` to every connection on a local port and returns the base
/// URL. With `None` the server accepts connections and never answers.
pub async fn http_stub(reply: Option<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let reply = reply.clone();
            tokio::spawn(async move {
                let mut request = vec![0u8; 4096];
                let _ = socket.read(&mut request).await;
                match reply {
                    Some(reply) => {
                        let _ = socket.write_all(reply.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    None => tokio::time::sleep(Duration::from_secs(60)).await,
                }
            });
        }
    });
    format!("http://{addr}")
}
