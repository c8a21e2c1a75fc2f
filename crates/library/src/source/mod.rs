//! Read access to the bytes behind a record.
//!
//! Records never hold their content directly. They hold a [`SourceHandle`]
//! that can be sliced, buffered or streamed on demand, backed either by a
//! file on disk ([`FileSource`]) or by memory ([`MemorySource`]) for blobs
//! and entries extracted from archives.

pub mod error;
mod file;
mod memory;

pub use self::file::FileSource;
pub use self::memory::MemorySource;
use crate::source::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use futures::Stream;
use std::fmt::Debug;
use std::ops::Range;
use std::pin::Pin;
use std::sync::Arc;

/// Default chunk size for [`ByteSource::stream`].
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send + 'a>>;
pub type SourceHandle = Arc<dyn ByteSource>;

#[async_trait]
pub trait ByteSource: Send + Sync + Debug {
    /// Total length in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a sub-range of the content.
    ///
    /// Returns [`OutOfRange`](ErrorKind::OutOfRange) when the range is
    /// inverted or ends past [`len`](Self::len).
    async fn read_range(&self, range: Range<u64>) -> Result<Vec<u8>>;

    /// Buffer the whole content.
    async fn read_all(&self) -> Result<Vec<u8>>;

    /// Stream the content in chunks of at most `chunk_size` bytes.
    fn stream(&self, chunk_size: usize) -> ByteStream<'_>;

    /// Buffer the whole content and decode it as UTF-8.
    async fn read_text(&self) -> Result<String> {
        String::from_utf8(self.read_all().await?).or_raise(|| ErrorKind::NotText)
    }
}

fn check_range(range: &Range<u64>, len: u64) -> Result<()> {
    if range.start > range.end || range.end > len {
        exn::bail!(ErrorKind::OutOfRange {
            start: range.start,
            end: range.end,
            len,
        });
    }
    Ok(())
}
