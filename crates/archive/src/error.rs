//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Failed to start a new entry with the requested compression method.
    Encoder,
    /// Archive is corrupt or malformed. Don't retry with the same input.
    #[display("invalid or corrupted archive")]
    InvalidData,
    /// Two entries were given the same name inside one archive.
    #[display("duplicate entry: {_0}")]
    DuplicateEntry(#[error(not(source))] String),
    /// The requested method is not supported.
    #[display("unsupported compression method: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// The requested method is supported but not enabled.
    #[display("disabled compression method: {_0}")]
    DisabledFormat(#[error(not(source))] String),
    /// An I/O operation failed. Used for writing/encoding.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}
