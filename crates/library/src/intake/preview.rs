//! Transient preview references for image records.
//!
//! A [`PreviewHandle`] stands for a displayable reference to a record's
//! content. Handles are owned by their record and revoke themselves when
//! dropped, so removing a record, clearing the session or dropping it
//! releases every outstanding preview.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    next: Arc<AtomicU64>,
    live: Arc<AtomicUsize>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new preview reference for `name`.
    pub fn issue(&self, name: &str) -> PreviewHandle {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        self.live.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(id, name, "Issued preview");
        PreviewHandle {
            url: format!("preview://{id}/{name}"),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of handles that have not been revoked yet.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct PreviewHandle {
    url: String,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
        tracing::trace!(url = %self.url, "Revoked preview");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_revoke_on_drop() {
        let registry = PreviewRegistry::new();
        let first = registry.issue("a.jpg");
        let second = registry.issue("b.png");
        assert_eq!(registry.live(), 2);
        assert_ne!(first.url(), second.url());
        assert!(first.url().ends_with("/a.jpg"));
        drop(first);
        assert_eq!(registry.live(), 1);
        drop(second);
        assert_eq!(registry.live(), 0);
    }
}
