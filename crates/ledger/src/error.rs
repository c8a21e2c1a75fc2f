//! Ledger Error Types

use derive_more::{Display, Error};

/// A ledger error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The storage backend failed to read or write a ledger document.
    #[display("could not access ledger document `{_0}`")]
    Storage(#[error(not(source))] String),
    /// A ledger document exists but could not be (de)serialized.
    #[display("ledger document `{_0}` is not valid")]
    InvalidData(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
