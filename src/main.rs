use std::sync::Arc;

use pricewatch::PricewatchError;
use pricewatch::Tracker;
use pricewatch::config::fetch_config;
use pricewatch::display::LogDisplay;
use pricewatch::store::{FileStore, MemoryStore, Store};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), PricewatchError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let app_config = fetch_config()?;

    let store: Arc<dyn Store> = match &app_config.data_dir {
        Some(dir) => Arc::new(FileStore::open(dir)?),
        None => Arc::new(MemoryStore::new()),
    };
    let tracker = Tracker::new(&app_config, store, Arc::new(LogDisplay))?;
    tracker.load();

    tokio::select! {
        () = tracker.run() => {}
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}
