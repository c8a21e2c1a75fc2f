use derive_more::{Display, Error};
use std::path::PathBuf;

/// A byte source error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for byte source operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backing file could not be opened or read.
    #[display("could not read `{}`", _0.display())]
    Read(#[error(not(source))] PathBuf),
    /// Requested byte range lies outside the content.
    #[display("range {start}..{end} is out of bounds for {len} bytes")]
    OutOfRange { start: u64, end: u64, len: u64 },
    /// Content is not valid UTF-8.
    #[display("content is not valid UTF-8")]
    NotText,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}
