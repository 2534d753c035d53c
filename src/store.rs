//! Persistence collaborator for the tracker's collections.
//!
//! A [`Store`] holds opaque JSON blobs under fixed collection keys. Loading
//! is forgiving: a missing or unreadable collection comes back as its
//! default value. Saving reports failure to the caller and never retries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{PricewatchError, Result};

/// Named collections persisted by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Holdings,
    Trades,
    Watchlist,
    Alerts,
    TriggeredAlerts,
}

impl Collection {
    /// Storage key for this collection.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Holdings => "crypto-portfolio",
            Collection::Trades => "crypto-trades",
            Collection::Watchlist => "crypto-watchlist",
            Collection::Alerts => "crypto-alerts",
            Collection::TriggeredAlerts => "crypto-triggered-alerts",
        }
    }
}

/// Key-value storage of serialized collections.
pub trait Store: Send + Sync {
    /// Returns the stored blob, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`PricewatchError::Storage`] if the backend cannot be read.
    fn load(&self, collection: Collection) -> Result<Option<String>>;

    /// Replaces the stored blob.
    ///
    /// # Errors
    ///
    /// Returns [`PricewatchError::Storage`] if the backend cannot be written.
    fn save(&self, collection: Collection, blob: &str) -> Result<()>;
}

/// Loads and decodes a collection, falling back to `T::default()` when it is
/// absent, unreadable, or corrupt.
pub fn load_collection<T>(store: &dyn Store, collection: Collection) -> T
where
    T: DeserializeOwned + Default,
{
    match store.load(collection) {
        Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
            warn!(collection = collection.key(), "discarding corrupt collection: {e}");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!(collection = collection.key(), "failed to load collection: {e}");
            T::default()
        }
    }
}

/// Encodes and saves a collection.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn save_collection<T>(store: &dyn Store, collection: Collection, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let blob = serde_json::to_string(value)?;
    store.save(collection, &blob)
}

/// In-process store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<Collection, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load(&self, collection: Collection) -> Result<Option<String>> {
        let blobs = self
            .blobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(blobs.get(&collection).cloned())
    }

    fn save(&self, collection: Collection, blob: &str) -> Result<()> {
        self.blobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(collection, blob.to_string());
        Ok(())
    }
}

/// Stores each collection as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) the store directory.
    ///
    /// # Errors
    ///
    /// Returns [`PricewatchError::Storage`] if the directory cannot be
    /// created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            PricewatchError::Storage(format!("failed to create {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.key()))
    }
}

impl Store for FileStore {
    fn load(&self, collection: Collection) -> Result<Option<String>> {
        let path = self.path(collection);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PricewatchError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn save(&self, collection: Collection, blob: &str) -> Result<()> {
        let path = self.path(collection);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, blob)
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(|e| PricewatchError::Storage(format!("failed to write {}: {e}", path.display())))
    }
}
