//! The [`StorageBackend`] trait and its implementations.

mod local;
#[cfg(feature = "mock")]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::FileInfo;
use crate::error::Result;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

pub type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// A directory-like place renamr reads from and writes to.
///
/// Paths are relative to the backend root and pass through
/// [`validate_path`](crate::validate_path) before use.
///
/// ```
/// use renamr_storage::{StorageBackend, error::Result};
/// use std::path::Path;
///
/// async fn load_or_empty(backend: &dyn StorageBackend) -> Result<Vec<u8>> {
///     let path = Path::new("history.json");
///     if backend.exists(path).await? { backend.read(path).await } else { Ok(b"[]".to_vec()) }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// Every file under the root, depth-first.
    ///
    /// Within a directory, files come first in name order, then each
    /// subdirectory in name order. Symbolic links are not followed, and
    /// anything that is neither a file nor a directory is skipped.
    fn walk(&self) -> FileInfoStream<'_>;

    /// Collect [`walk`](Self::walk) into a [`Vec`].
    async fn files(&self) -> Result<Vec<FileInfo>> {
        self.walk().try_collect().await
    }

    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) for a missing
    /// file.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Create or replace a file, creating parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
}
