//! Storage Error Types

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// The path escapes the backend root or is otherwise unusable.
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// A backend root that exists but is not a directory.
    #[display("not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    #[display("I/O error: {_0}")]
    Io(IoError),
}

impl ErrorKind {
    pub(crate) fn from_io(err: IoError, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into()),
            _ => Self::Io(err),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io() {
        let kind = ErrorKind::from_io(IoError::from(std::io::ErrorKind::NotFound), "history.json");
        assert_eq!(kind.to_string(), "file not found: history.json");
        let kind = ErrorKind::from_io(IoError::from(std::io::ErrorKind::PermissionDenied), "out");
        assert!(matches!(kind, ErrorKind::PermissionDenied(_)));
        assert!(ErrorKind::from_io(IoError::other("disk full"), "out").is_retryable());
        assert!(!ErrorKind::NotADirectory(PathBuf::from("x")).is_retryable());
    }
}
