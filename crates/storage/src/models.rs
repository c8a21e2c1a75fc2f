use std::path::PathBuf;
use time::OffsetDateTime;

/// A file found by [`walk`](crate::StorageBackend::walk).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative to the backend root.
    pub path: PathBuf,
    pub size: u64,
    pub modified: OffsetDateTime,
}

impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: impl Into<OffsetDateTime>) -> Self {
        let path = path.into();
        let modified = modified.into();
        Self { path, size, modified }
    }

    /// Last path component; `None` if it is not valid UTF-8.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()?.to_str()
    }
}
