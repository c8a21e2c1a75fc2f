use std::path::PathBuf;
use time::OffsetDateTime;

/// One item handed to [`Session::ingest`](crate::Session::ingest).
#[derive(Debug, Clone)]
pub enum RawInput {
    /// A file on disk.
    File { path: PathBuf, declared_type: Option<String> },
    /// Bytes already in memory, with the name they should be known by.
    Blob {
        name: String,
        bytes: Vec<u8>,
        declared_type: Option<String>,
        last_modified: Option<OffsetDateTime>,
    },
    /// A directory; every file below it becomes a record.
    Directory { path: PathBuf },
}

impl RawInput {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            declared_type: None,
        }
    }

    pub fn blob(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Blob {
            name: name.into(),
            bytes: bytes.into(),
            declared_type: None,
            last_modified: None,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory { path: path.into() }
    }

    /// Set the declared MIME type. Has no effect on directories.
    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        match &mut self {
            Self::File { declared_type, .. } | Self::Blob { declared_type, .. } => {
                *declared_type = Some(mime_type.into());
            },
            Self::Directory { .. } => {},
        }
        self
    }

    /// Input given on the command line: directories are walked, everything
    /// else is a file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() { Self::directory(path) } else { Self::file(path) }
    }
}
