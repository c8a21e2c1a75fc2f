use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A single file that took part in a rename operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedFile {
    pub old_name: String,
    pub new_name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Count and total size of the files seen for one MIME type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStats {
    pub count: u64,
    pub bytes: u64,
}

/// Activity within one time bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub operations: u64,
    pub files: u64,
}

/// Aggregate usage counters.
///
/// Counters accumulate for as long as the document exists; time-based views
/// are kept as weekly (`YYYY-Www`, ISO week) and monthly (`YYYY-MM`)
/// buckets rather than by resetting the totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analytics {
    pub total_files: u64,
    pub total_renames: u64,
    pub total_bytes: u64,
    pub successes: u64,
    pub errors: u64,
    pub types: BTreeMap<String, TypeStats>,
    pub base_names: BTreeMap<String, u64>,
    pub weekly: BTreeMap<String, Usage>,
    pub monthly: BTreeMap<String, Usage>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub first_used: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_used: Option<OffsetDateTime>,
}

/// ISO week bucket key, e.g. `2024-W09`.
pub fn week_key(at: OffsetDateTime) -> String {
    let (year, week, _) = at.to_iso_week_date();
    format!("{year}-W{week:02}")
}

/// Calendar month bucket key, e.g. `2024-03`.
pub fn month_key(at: OffsetDateTime) -> String {
    format!("{}-{:02}", at.year(), u8::from(at.month()))
}

impl Analytics {
    pub fn record_rename(&mut self, base: &str, files: &[RenamedFile], at: OffsetDateTime) {
        let count = files.len() as u64;
        self.total_renames += 1;
        self.total_files += count;
        for file in files {
            self.total_bytes += file.size;
            let stats = self.types.entry(file.mime_type.clone()).or_default();
            stats.count += 1;
            stats.bytes += file.size;
        }
        *self.base_names.entry(base.to_string()).or_default() += 1;
        for bucket in [self.weekly.entry(week_key(at)).or_default(), self.monthly.entry(month_key(at)).or_default()] {
            bucket.operations += 1;
            bucket.files += count;
        }
        self.touch(at);
    }

    pub fn record_success(&mut self, at: OffsetDateTime) {
        self.successes += 1;
        self.touch(at);
    }

    pub fn record_failure(&mut self, at: OffsetDateTime) {
        self.errors += 1;
        self.touch(at);
    }

    fn touch(&mut self, at: OffsetDateTime) {
        self.first_used.get_or_insert(at);
        self.last_used = Some(at);
    }

    /// Most common MIME types by file count (ties broken by name).
    pub fn top_types(&self, n: usize) -> Vec<(&str, TypeStats)> {
        let mut types: Vec<_> = self.types.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        types.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        types.truncate(n);
        types
    }

    /// Most used base names (ties broken by name).
    pub fn top_base_names(&self, n: usize) -> Vec<(&str, u64)> {
        let mut names: Vec<_> = self.base_names.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        names.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        names.truncate(n);
        names
    }

    /// Average file size in bytes, or `None` before any file was seen.
    pub fn average_size(&self) -> Option<u64> {
        self.total_bytes.checked_div(self.total_files)
    }

    pub fn average_size_of(&self, mime_type: &str) -> Option<u64> {
        self.types.get(mime_type).and_then(|stats| stats.bytes.checked_div(stats.count))
    }

    /// Fraction of finished operations that succeeded, in `0.0..=1.0`.
    pub fn success_rate(&self) -> Option<f64> {
        let attempts = self.successes + self.errors;
        (attempts > 0).then(|| self.successes as f64 / attempts as f64)
    }
}
