//! Error types for the [`archive`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive build error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive build operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an archive build failure.
///
/// ### Validation Errors
/// - [`ErrorKind::EmptyBaseName`]
/// - [`ErrorKind::EmptySelection`]
/// - [`ErrorKind::Naming`]
/// - [`ErrorKind::DuplicateName`]
///
/// ### Operational Errors
/// - [`ErrorKind::Read`] - nothing is written when any entry fails to read.
/// - [`ErrorKind::Cancelled`]
/// - [`ErrorKind::Assemble`]
/// - [`ErrorKind::Storage`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("base name is empty")]
    EmptyBaseName,
    #[display("no files selected")]
    EmptySelection,
    /// A fallback entry name could not be generated.
    #[display("could not name archive entries")]
    Naming,
    /// Two selected records would share an entry name, as happens when a
    /// fresh record's fallback name matches an earlier assigned name.
    #[display("duplicate entry name `{_0}`")]
    DuplicateName(#[error(not(source))] String),
    /// Reading the content of one entry failed.
    #[display("could not read `{_0}`")]
    Read(#[error(not(source))] String),
    /// The build was cancelled before the archive was assembled.
    #[display("archive build cancelled")]
    Cancelled,
    /// Compressing the collected entries failed.
    #[display("could not assemble archive")]
    Assemble,
    /// Writing the finished archive failed.
    #[display("could not write archive to `{}`", _0.display())]
    Storage(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Storage(_))
    }

    /// Whether the failure should count against the success rate. Refused
    /// requests and cancellations do not.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Assemble | Self::Storage(_))
    }
}
