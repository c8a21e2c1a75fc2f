//! Dry-run wrapper.

use crate::backend::FileInfoStream;
use crate::error::Result;
use crate::{BackendHandle, StorageBackend};
use async_trait::async_trait;
use std::path::Path;

/// Forwards reads to the wrapped backend and drops writes, reporting
/// success and logging each one at `info`.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}

impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn walk(&self) -> FileInfoStream<'_> {
        self.inner.walk()
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        tracing::info!(backend = self.inner.name(), path = %path.display(), bytes = data.len(), "Skipping write in dry-run mode");
        Ok(())
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_writes_are_dropped() {
        let inner: BackendHandle = Arc::new(MockBackend::with_files([("history.json", "[]")]));
        let dry = ReadOnlyBackend::new(inner.clone());
        dry.write(Path::new("trip_files.zip"), b"PK").await.unwrap();
        dry.write(Path::new("history.json"), b"[{}]").await.unwrap();
        assert!(!inner.exists(Path::new("trip_files.zip")).await.unwrap());
        assert_eq!(dry.read(Path::new("history.json")).await.unwrap(), b"[]");
        assert_eq!(dry.files().await.unwrap().len(), 1);
    }
}
