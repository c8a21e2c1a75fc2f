//! Error types for the [`intake`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An intake error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for intake operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a batch of inputs was not admitted. Any of these leaves the session
/// untouched.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The batch would take the session past its file limit.
    #[display("too many files: at most {limit} allowed, this would make {attempted}")]
    TooManyFiles { limit: usize, attempted: usize },
    /// An input detected as a ZIP archive could not be extracted.
    #[display("could not extract archive `{_0}`")]
    Extraction(#[error(not(source))] String),
    /// An input file could not be inspected or read.
    #[display("could not read `{}`", _0.display())]
    Read(#[error(not(source))] PathBuf),
    /// A directory could not be traversed.
    #[display("could not walk directory `{}`", _0.display())]
    Walk(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Walk(_))
    }
}
