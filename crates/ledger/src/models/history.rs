use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use time::OffsetDateTime;

/// Default number of entries kept in the history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One renamed file, as remembered by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub old_name: String,
    pub new_name: String,
    pub mime_type: String,
}

/// Bounded, newest-first rename log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Rebuild a history from persisted entries (already newest-first),
    /// dropping anything beyond the limit.
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>, limit: usize) -> Self {
        let entries = entries.into_iter().take(limit).collect();
        Self { entries, limit }
    }

    /// Push one rename batch to the front. The batch keeps its own order, so
    /// the first file of the selection ends up as the newest entry; the
    /// oldest entries are evicted once the limit is exceeded.
    pub fn push_batch(&mut self, batch: impl IntoIterator<Item = HistoryEntry>) {
        let batch: Vec<_> = batch.into_iter().collect();
        for entry in batch.into_iter().rev() {
            self.entries.push_front(entry);
        }
        self.entries.truncate(self.limit);
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
