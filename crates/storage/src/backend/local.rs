//! Backend over a directory on the local filesystem.

use crate::backend::FileInfoStream;
use crate::error::{ErrorKind, Result};
use crate::{FileInfo, StorageBackend, validate_path};
use async_stream::stream;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files under a root directory, accessed through `tokio::fs`.
///
/// ```no_run
/// use renamr_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let output = LocalBackend::new("output", "/home/me/Downloads")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}

impl LocalBackend {
    /// Open `root`, creating it when missing.
    ///
    /// The root must be absolute; an existing non-directory is
    /// [`NotADirectory`](ErrorKind::NotADirectory).
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() && !root.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(root));
        }
        // Blocking, but only once per backend.
        std::fs::create_dir_all(&root).map_err(|err| ErrorKind::from_io(err, &root))?;
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a backend-relative path.
    pub fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(self.root.join(validate_path(path)?))
    }

    /// Split one directory into its files (as [`FileInfo`] relative to the
    /// root) and its subdirectories, both sorted by name.
    async fn read_directory(&self, dir: &Path) -> Result<(Vec<FileInfo>, Vec<PathBuf>)> {
        let io = |err| ErrorKind::from_io(err, dir);
        let mut entries = fs::read_dir(dir).await.map_err(io)?;
        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io)? {
            let path = entry.path();
            // Does not follow symlinks, so links (and link loops) are never
            // walked into.
            let metadata = entry.metadata().await.map_err(|err| ErrorKind::from_io(err, &path))?;
            if metadata.is_dir() {
                subdirs.push(path);
            } else if metadata.is_file() {
                let relative = path.strip_prefix(&self.root).map_err(|_| ErrorKind::InvalidPath(path.clone()))?;
                let modified = metadata.modified().map_err(|err| ErrorKind::from_io(err, &path))?;
                files.push(FileInfo::new(relative, metadata.len(), modified));
            } else {
                tracing::debug!(path = %path.display(), "Skipping entry that is neither a file nor a directory");
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        subdirs.sort();
        Ok((files, subdirs))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk(&self) -> FileInfoStream<'_> {
        Box::pin(stream! {
            let mut pending = vec![self.root.clone()];
            while let Some(dir) = pending.pop() {
                match self.read_directory(&dir).await {
                    Ok((files, subdirs)) => {
                        for file in files {
                            yield Ok(file);
                        }
                        pending.extend(subdirs.into_iter().rev());
                    },
                    Err(err) => yield Err(err),
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = self.absolute_path(path)?;
        Ok(fs::try_exists(&path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let absolute = self.absolute_path(path)?;
        Ok(fs::read(&absolute).await.map_err(|err| ErrorKind::from_io(err, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let absolute = self.absolute_path(path)?;
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await.map_err(|err| ErrorKind::from_io(err, path))?;
        }
        Ok(fs::write(&absolute, data).await.map_err(|err| ErrorKind::from_io(err, path))?)
    }
}
