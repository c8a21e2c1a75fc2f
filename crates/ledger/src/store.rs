//! JSON persistence of the ledger documents.

use crate::error::{ErrorKind, Result};
use crate::models::{Analytics, History, HistoryEntry};
use exn::ResultExt;
use renamr_storage::BackendHandle;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::instrument;

pub const HISTORY_KEY: &str = "history.json";
pub const ANALYTICS_KEY: &str = "analytics.json";

/// Reads and writes the two independent ledger documents through a storage
/// backend.
#[derive(Clone)]
pub struct LedgerStore {
    backend: BackendHandle,
}

impl LedgerStore {
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend }
    }

    /// Load a document, `None` if it does not exist.
    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = Path::new(key);
        if !self.backend.exists(path).await.or_raise(|| ErrorKind::Storage(key.to_string()))? {
            return Ok(None);
        }
        let bytes = self.backend.read(path).await.or_raise(|| ErrorKind::Storage(key.to_string()))?;
        let value = serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidData(key.to_string()))?;
        Ok(Some(value))
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value).or_raise(|| ErrorKind::InvalidData(key.to_string()))?;
        self.backend.write(Path::new(key), &bytes).await.or_raise(|| ErrorKind::Storage(key.to_string()))
    }

    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn load_history(&self, limit: usize) -> Result<History> {
        let entries: Vec<HistoryEntry> = self.load(HISTORY_KEY).await?.unwrap_or_default();
        Ok(History::from_entries(entries, limit))
    }

    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn load_analytics(&self) -> Result<Analytics> {
        Ok(self.load(ANALYTICS_KEY).await?.unwrap_or_default())
    }

    #[instrument(skip_all, fields(backend = self.backend.name(), entries = history.len()))]
    pub async fn save_history(&self, history: &History) -> Result<()> {
        let entries: Vec<&HistoryEntry> = history.iter().collect();
        self.save(HISTORY_KEY, &entries).await
    }

    #[instrument(skip_all, fields(backend = self.backend.name()))]
    pub async fn save_analytics(&self, analytics: &Analytics) -> Result<()> {
        self.save(ANALYTICS_KEY, analytics).await
    }
}
