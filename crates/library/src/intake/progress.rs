//! Cosmetic load progress for large records.
//!
//! Each ticker is a tokio task that bumps a percentage by a random step on a
//! fixed interval until it reaches 100. The registry owns the tasks: they
//! are aborted when their record is removed, when the registry is cleared,
//! or when it is dropped.

use super::RecordId;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const TICK: Duration = Duration::from_millis(100);
const MIN_STEP: u8 = 5;
const MAX_STEP: u8 = 20;

struct Ticker {
    percent: Arc<AtomicU8>,
    task: JoinHandle<()>,
}

#[derive(Default)]
pub struct ProgressRegistry {
    tickers: HashMap<RecordId, Ticker>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a ticker for `id`, replacing any existing one. Must be called
    /// from within a tokio runtime.
    pub fn start(&mut self, id: RecordId) {
        let percent = Arc::new(AtomicU8::new(0));
        let task = tokio::spawn(tick(Arc::clone(&percent)));
        if let Some(previous) = self.tickers.insert(id, Ticker { percent, task }) {
            previous.task.abort();
        }
    }

    /// Stop and forget the ticker for `id`. Returns `false` if there was none.
    pub fn cancel(&mut self, id: RecordId) -> bool {
        match self.tickers.remove(&id) {
            Some(ticker) => {
                ticker.task.abort();
                true
            },
            None => false,
        }
    }

    /// Stop and forget every ticker.
    pub fn clear(&mut self) {
        for (_, ticker) in self.tickers.drain() {
            ticker.task.abort();
        }
    }

    /// Current percentage for `id`, if it has a ticker.
    pub fn percent(&self, id: RecordId) -> Option<u8> {
        self.tickers.get(&id).map(|ticker| ticker.percent.load(Ordering::Relaxed))
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl Drop for ProgressRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

async fn tick(percent: Arc<AtomicU8>) {
    let mut interval = tokio::time::interval(TICK);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        let step = rand::rng().random_range(MIN_STEP..=MAX_STEP);
        let next = percent.load(Ordering::Relaxed).saturating_add(step).min(100);
        percent.store(next, Ordering::Relaxed);
        if next == 100 {
            break;
        }
    }
}
