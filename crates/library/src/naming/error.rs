//! Error types for the [`naming`](super) module.

use derive_more::{Display, Error};

/// A naming error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for naming operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a rename was refused. No record is touched when any of these is
/// returned.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The base name is empty once unsafe characters are removed.
    #[display("base name is empty")]
    EmptyBaseName,
    /// The current filter selects no records.
    #[display("no files selected")]
    EmptySelection,
    /// The naming template failed to compile or render.
    #[display("issue with name generation from template")]
    Template,
    /// A generated name is not a plain file name.
    #[display("generated name `{_0}` is not a valid file name")]
    InvalidName(#[error(not(source))] String),
    /// Two records would end up with the same name.
    #[display("generated name `{_0}` is used more than once")]
    DuplicateName(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
