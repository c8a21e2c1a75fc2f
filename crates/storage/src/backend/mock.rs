//! In-memory backend for tests.

use crate::backend::FileInfoStream;
use crate::error::{ErrorKind, Result};
use crate::{FileInfo, StorageBackend, validate_path};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// Files kept in an ordered map.
///
/// [`walk`](StorageBackend::walk) yields in path order rather than the
/// files-then-subdirectories order of [`LocalBackend`](super::LocalBackend);
/// tests relying on walk order should use the real thing.
///
/// ```
/// use renamr_storage::{StorageBackend, backend::MockBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("history.json", "[]")]);
/// backend.write(Path::new("analytics.json"), b"{}").await?;
/// assert_eq!(backend.files().await?.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    files: RwLock<BTreeMap<PathBuf, (OffsetDateTime, Vec<u8>)>>,
}

impl MockBackend {
    /// Panics on a path that fails [`validate_path`].
    pub fn with_files(files: impl IntoIterator<Item = (impl AsRef<Path>, impl Into<Vec<u8>>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let files = files
            .into_iter()
            .map(|(path, data)| match validate_path(path.as_ref()) {
                Ok(path) => (path, (now, data.into())),
                Err(err) => panic!("invalid mock path: {err}"),
            })
            .collect();
        Self {
            name: "mock".to_string(),
            files: RwLock::new(files),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::with_files(Vec::<(&str, Vec<u8>)>::new())
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk(&self) -> FileInfoStream<'_> {
        Box::pin(async_stream::stream! {
            let snapshot: Vec<FileInfo> = self
                .files
                .read()
                .await
                .iter()
                .map(|(path, (modified, data))| FileInfo::new(path.clone(), data.len() as u64, *modified))
                .collect();
            for info in snapshot {
                yield Ok(info);
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.files.read().await.contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        match self.files.read().await.get(&path) {
            Some((_, data)) => Ok(data.clone()),
            None => exn::bail!(ErrorKind::NotFound(path)),
        }
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        self.files.write().await.insert(path, (OffsetDateTime::now_utc(), data.to_vec()));
        Ok(())
    }
}
