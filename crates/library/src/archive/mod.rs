//! Archive assembly for a selection of records.
//!
//! Entry contents are read in sequential batches: every read inside a batch
//! runs concurrently, and the next batch only starts once the previous one
//! has finished. Compression happens once, on a blocking worker, after all
//! content has been collected.

pub mod error;

use crate::archive::error::{ErrorKind, Result};
use crate::source::SourceHandle;
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use futures::future::try_join_all;
use renamr_archive::Compression;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Tuning for [`build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Number of entries read concurrently.
    pub batch_size: usize,
    pub compression: Compression,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            compression: Compression::default(),
        }
    }
}

/// Progress events emitted while an archive is built.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once, with the entry count.
/// 2. [`Progress`](Self::Progress): once per batch, with a monotonically
///    increasing percentage below 100.
/// 3. [`Finalizing`](Self::Finalizing): exactly once, before compression.
/// 4. [`Complete`](Self::Complete): exactly once; the build is at 100%.
///
/// An error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum ArchiveEvent {
    Started { total: usize },
    Progress(u8),
    Finalizing,
    Complete(Archive),
}

/// A finished, in-memory archive.
pub struct Archive {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub entries: usize,
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .field("entries", &self.entries)
            .finish()
    }
}

/// Where a finished archive was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub path: PathBuf,
    pub entries: usize,
    pub size: u64,
}

/// File name of the archive for `base`.
pub fn archive_name(base: &str) -> String {
    format!("{base}_files.zip")
}

/// Everything needed to build one archive, detached from the session.
#[derive(Debug)]
pub(crate) struct Job {
    pub file_name: String,
    pub entries: Vec<(String, SourceHandle)>,
}

fn percent(done: usize, total: usize) -> u8 {
    // Capped at 99: 100 is reserved for the finished archive.
    u8::try_from(done * 99 / total.max(1)).unwrap_or(99)
}

async fn read_entry(name: &str, source: &SourceHandle) -> Result<(String, Vec<u8>)> {
    let bytes = source.read_all().await.or_raise(|| ErrorKind::Read(name.to_string()))?;
    Ok((name.to_string(), bytes))
}

/// Stream [`ArchiveEvent`]s while building the archive described by `job`.
///
/// `cancel` is checked before every batch and raced against the reads in
/// flight; a cancelled build ends with [`Cancelled`](ErrorKind::Cancelled).
pub(crate) fn build(
    job: Job,
    options: ArchiveOptions,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<ArchiveEvent>> + Send + 'static {
    let span = tracing::info_span!("build_archive", archive = %job.file_name, entries = job.entries.len());
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let Job { file_name, entries } = job;
        let total = entries.len();
        yield Ok(ArchiveEvent::Started { total });

        let mut collected = Vec::with_capacity(total);
        for batch in entries.chunks(options.batch_size.max(1)) {
            if cancel.is_cancelled() {
                yield Err(exn::Exn::from(ErrorKind::Cancelled));
                return;
            }
            let reads = try_join_all(batch.iter().map(|(name, source)| read_entry(name, source)));
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(exn::Exn::from(ErrorKind::Cancelled)),
                result = reads.instrument(span.clone()) => result,
            };
            match result {
                Ok(read) => collected.extend(read),
                Err(e) => {
                    yield Err(e);
                    return;
                },
            }
            span.in_scope(|| tracing::debug!(done = collected.len(), total, "Collected batch"));
            yield Ok(ArchiveEvent::Progress(percent(collected.len(), total)));
        }

        yield Ok(ArchiveEvent::Finalizing);
        let compression = options.compression;
        let packed = tokio::task::spawn_blocking(move || compression.pack(collected))
            .await
            .or_raise(|| ErrorKind::Assemble)
            .and_then(|packed| packed.or_raise(|| ErrorKind::Assemble));
        match packed {
            Ok(bytes) => {
                span.in_scope(|| tracing::info!(size = bytes.len(), %compression, "Assembled archive"));
                yield Ok(ArchiveEvent::Complete(Archive {
                    file_name,
                    bytes,
                    entries: total,
                }));
            },
            Err(e) => yield Err(e),
        }
    })
}
