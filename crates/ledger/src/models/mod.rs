mod analytics;
mod history;

pub use self::analytics::{Analytics, RenamedFile, TypeStats, Usage, month_key, week_key};
pub use self::history::{DEFAULT_HISTORY_LIMIT, History, HistoryEntry};
