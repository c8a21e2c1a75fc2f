//! ZIP packing and unpacking with a configurable compression method.
//!
//! This crate wraps the [`zip`] crate behind a small, opinionated API:
//!
//! - **Packing** named in-memory entries into a single archive
//!   ([`Compression::pack`])
//! - **Unpacking** an archive into flat, named entries, discarding directory
//!   structure and refusing entries over a size limit ([`unpack`])
//! - **Format detection** from file names ([`is_archive_name`]), declared
//!   MIME types ([`is_archive_type`]) or magic bytes ([`is_archive_magic`])
//!
//! Stored and Deflate are always available. Optional methods (Bzip2, Zstd)
//! are behind feature flags of the same name.
//!
//! Compression levels are fixed per method at a moderate setting; archives
//! are assembled once per download, so a balanced level is preferred over
//! the smallest possible output.

mod construct;
pub mod error;
mod pack;
#[cfg(feature = "serde")]
mod serialize;
mod unpack;
mod util;

pub use crate::construct::{is_archive, is_archive_magic, is_archive_name, is_archive_type};
pub use crate::unpack::{Entry, Oversized, Unpacked, unpack};

/// A supported per-entry compression method.
///
/// Variants gated behind feature flags (`bzip2`, `zstd`) are only available
/// when the corresponding feature is enabled. Defaults to
/// [`Deflate`](Self::Deflate).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// No compression, entries are stored as-is
    Stored,
    /// Deflate compression (the ubiquitous ZIP default)
    #[default]
    Deflate,
    /// Bzip2 compression
    #[cfg(feature = "bzip2")]
    Bzip2,
    /// Zstd compression
    #[cfg(feature = "zstd")]
    Zstd,
}
