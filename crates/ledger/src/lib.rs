//! Rename history and usage analytics.
//!
//! The [`Ledger`] keeps a bounded, newest-first log of renamed files and an
//! accumulating [`Analytics`] document. Both are read once when the ledger is
//! opened and written back on [`Ledger::persist`]. Persistence is best
//! effort: a missing or corrupt document starts from defaults, and a failed
//! write is logged and otherwise ignored.

pub mod error;
mod models;
mod store;

pub use crate::models::{
    Analytics, DEFAULT_HISTORY_LIMIT, History, HistoryEntry, RenamedFile, TypeStats, Usage, month_key, week_key,
};
pub use crate::store::{ANALYTICS_KEY, HISTORY_KEY, LedgerStore};
use renamr_storage::BackendHandle;
use time::OffsetDateTime;
use tracing::instrument;

pub struct Ledger {
    store: LedgerStore,
    history: History,
    analytics: Analytics,
}

impl Ledger {
    /// Open the ledger stored in `backend`. Never fails; unreadable documents
    /// are replaced by empty ones.
    #[instrument(skip(backend), fields(backend = backend.name()))]
    pub async fn open(backend: BackendHandle, history_limit: usize) -> Self {
        let store = LedgerStore::new(backend);
        let history = store.load_history(history_limit).await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Starting with an empty rename history");
            History::new(history_limit)
        });
        let analytics = store.load_analytics().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Starting with empty analytics");
            Analytics::default()
        });
        Self {
            store,
            history,
            analytics,
        }
    }

    /// Record one rename operation over `files` (in selection order).
    pub fn record_rename(&mut self, base: &str, files: &[RenamedFile]) {
        self.record_rename_at(base, files, OffsetDateTime::now_utc());
    }

    pub fn record_rename_at(&mut self, base: &str, files: &[RenamedFile], at: OffsetDateTime) {
        self.history.push_batch(files.iter().map(|file| HistoryEntry {
            timestamp: at,
            old_name: file.old_name.clone(),
            new_name: file.new_name.clone(),
            mime_type: file.mime_type.clone(),
        }));
        self.analytics.record_rename(base, files, at);
        tracing::debug!(base, files = files.len(), history = self.history.len(), "Recorded rename");
    }

    pub fn record_success(&mut self) {
        self.analytics.record_success(OffsetDateTime::now_utc());
    }

    pub fn record_failure(&mut self) {
        self.analytics.record_failure(OffsetDateTime::now_utc());
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    /// Write both documents. Each document is written independently, so a
    /// failure to write one does not prevent writing the other.
    pub async fn persist(&self) {
        if let Err(err) = self.store.save_history(&self.history).await {
            tracing::warn!(error = ?err, "Could not persist rename history");
        }
        if let Err(err) = self.store.save_analytics(&self.analytics).await {
            tracing::warn!(error = ?err, "Could not persist analytics");
        }
    }
}
