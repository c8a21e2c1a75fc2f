//! Turning raw inputs into file records.
//!
//! Inputs are expanded before anything is admitted: ZIP archives (detected
//! by name, declared type or magic bytes) are extracted into one candidate
//! per file entry, directories are walked depth-first into one candidate per
//! leaf file. Files over the size limit are set aside as rejections while
//! collecting; archive entries over it are never decompressed in full. The
//! file limit is then applied by the session in one step, so a batch is
//! either admitted as a whole (minus individually oversized files) or not at
//! all.

pub mod error;
mod input;
pub mod mime;
mod preview;
mod progress;
mod record;
#[cfg(test)]
pub(crate) mod testing;

pub use self::input::RawInput;
pub use self::preview::{PreviewHandle, PreviewRegistry};
pub use self::progress::{ProgressRegistry, TICK as PROGRESS_TICK};
pub use self::record::{FileRecord, RecordId};
use crate::intake::error::{ErrorKind, Result};
use crate::source::{ByteSource, FileSource, MemorySource, SourceHandle};
use derive_more::Display;
use exn::{OptionExt, ResultExt};
use futures::TryStreamExt;
use renamr_storage::StorageBackend;
use renamr_storage::backend::LocalBackend;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::fs;
use tracing::instrument;

const MIB: u64 = 1024 * 1024;
/// Bytes needed to recognise a ZIP signature.
const MAGIC_LEN: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_files: usize,
    /// Inclusive; a file of exactly this size is admitted.
    pub max_file_size: u64,
    pub progress_threshold: u64,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_files: 20,
            max_file_size: 100 * MIB,
            progress_threshold: MIB,
        }
    }
}

/// A file left out of an otherwise admitted batch.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("`{name}` is {size} bytes, over the {limit} byte limit")]
pub struct Rejection {
    pub name: String,
    pub size: u64,
    pub limit: u64,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub admitted: Vec<RecordId>,
    pub rejected: Vec<Rejection>,
}

/// An expanded input that has not been admitted yet.
#[derive(Debug)]
pub(crate) struct Candidate {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub last_modified: OffsetDateTime,
    pub source: SourceHandle,
}

/// Inputs expanded so far, split by the size limit.
#[derive(Debug)]
pub(crate) struct Collected {
    pub candidates: Vec<Candidate>,
    pub rejected: Vec<Rejection>,
    max_file_size: u64,
}

impl Collected {
    fn new(max_file_size: u64) -> Self {
        Self {
            candidates: Vec::new(),
            rejected: Vec::new(),
            max_file_size,
        }
    }

    fn push(&mut self, candidate: Candidate) {
        if candidate.size > self.max_file_size {
            self.reject(candidate.name, candidate.size);
        } else {
            self.candidates.push(candidate);
        }
    }

    fn reject(&mut self, name: String, size: u64) {
        let rejection = Rejection {
            name,
            size,
            limit: self.max_file_size,
        };
        tracing::info!(%rejection, "Rejected oversized file");
        self.rejected.push(rejection);
    }
}

/// Expand every input into candidates, in input order.
#[instrument(skip(inputs), fields(inputs = inputs.len(), candidates, rejected))]
pub(crate) async fn collect(inputs: Vec<RawInput>, max_file_size: u64) -> Result<Collected> {
    let mut out = Collected::new(max_file_size);
    for input in inputs {
        match input {
            RawInput::File { path, declared_type } => collect_file(&path, declared_type.as_deref(), &mut out).await?,
            RawInput::Blob {
                name,
                bytes,
                declared_type,
                last_modified,
            } => collect_blob(name, bytes, declared_type.as_deref(), last_modified, &mut out).await?,
            RawInput::Directory { path } => collect_directory(&path, &mut out).await?,
        }
    }
    tracing::Span::current()
        .record("candidates", out.candidates.len())
        .record("rejected", out.rejected.len());
    Ok(out)
}

async fn collect_file(path: &Path, declared_type: Option<&str>, out: &mut Collected) -> Result<()> {
    let read_error = || ErrorKind::Read(path.to_path_buf());
    let metadata = fs::metadata(path).await.or_raise(read_error)?;
    if !metadata.is_file() {
        exn::bail!(read_error());
    }
    let name = path.file_name().and_then(|n| n.to_str()).ok_or_raise(read_error)?.to_string();
    let source = FileSource::new(path, metadata.len());
    let head = source.read_range(0..metadata.len().min(MAGIC_LEN)).await.or_raise(read_error)?;
    if renamr_archive::is_archive(&name, declared_type, &head) {
        return extract(name, ArchiveInput::File(path.to_path_buf()), out).await;
    }
    let last_modified = metadata.modified().map(OffsetDateTime::from).unwrap_or_else(|_| OffsetDateTime::now_utc());
    out.push(Candidate {
        mime_type: mime::resolve(&name, declared_type),
        name,
        size: source.len(),
        last_modified,
        source: Arc::new(source),
    });
    Ok(())
}

async fn collect_blob(
    name: String,
    bytes: Vec<u8>,
    declared_type: Option<&str>,
    last_modified: Option<OffsetDateTime>,
    out: &mut Collected,
) -> Result<()> {
    let head = &bytes[..bytes.len().min(MAGIC_LEN as usize)];
    if renamr_archive::is_archive(&name, declared_type, head) {
        return extract(name, ArchiveInput::Bytes(bytes), out).await;
    }
    out.push(Candidate {
        mime_type: mime::resolve(&name, declared_type),
        name,
        size: bytes.len() as u64,
        last_modified: last_modified.unwrap_or_else(OffsetDateTime::now_utc),
        source: Arc::new(MemorySource::new(bytes)),
    });
    Ok(())
}

/// Where an archive's bytes come from.
#[derive(Debug)]
enum ArchiveInput {
    /// Read from disk as needed rather than loaded whole.
    File(PathBuf),
    Bytes(Vec<u8>),
}

#[instrument(skip(input, out), fields(entries))]
async fn extract(name: String, input: ArchiveInput, out: &mut Collected) -> Result<()> {
    let limit = out.max_file_size;
    let archive = name.clone();
    let unpacked = tokio::task::spawn_blocking(move || -> Result<_> {
        let extraction_error = || ErrorKind::Extraction(archive.clone());
        match input {
            ArchiveInput::File(path) => {
                let file = std::fs::File::open(&path).or_raise(|| ErrorKind::Read(path.clone()))?;
                renamr_archive::unpack(BufReader::new(file), limit).or_raise(extraction_error)
            },
            ArchiveInput::Bytes(bytes) => renamr_archive::unpack(Cursor::new(bytes), limit).or_raise(extraction_error),
        }
    })
    .await
    .or_raise(|| ErrorKind::Extraction(name.clone()))??;
    tracing::Span::current().record("entries", unpacked.entries.len());
    let now = OffsetDateTime::now_utc();
    for entry in unpacked.entries {
        if entry.path != entry.name {
            tracing::debug!(path = %entry.path, name = %entry.name, "Flattened archive entry");
        }
        out.push(Candidate {
            mime_type: mime::resolve(&entry.name, None),
            size: entry.data.len() as u64,
            name: entry.name,
            last_modified: now,
            source: Arc::new(MemorySource::new(entry.data)),
        });
    }
    for oversized in unpacked.oversized {
        tracing::debug!(path = %oversized.path, "Archive entry left compressed");
        out.reject(oversized.name, oversized.size);
    }
    Ok(())
}

#[instrument(skip(out), fields(files))]
async fn collect_directory(path: &Path, out: &mut Collected) -> Result<()> {
    let root = std::path::absolute(path).or_raise(|| ErrorKind::Walk(path.to_path_buf()))?;
    // The backend would happily create a missing root.
    if !root.is_dir() {
        exn::bail!(ErrorKind::Walk(root));
    }
    let backend = LocalBackend::new("intake", &root).or_raise(|| ErrorKind::Walk(root.clone()))?;
    let mut files = backend.walk();
    let mut count = 0;
    while let Some(info) = files.try_next().await.or_raise(|| ErrorKind::Walk(root.clone()))? {
        let Some(name) = info.file_name().map(str::to_string) else {
            tracing::debug!(path = %info.path.display(), "Skipping file without a UTF-8 name");
            continue;
        };
        out.push(Candidate {
            mime_type: mime::resolve(&name, None),
            name,
            size: info.size,
            last_modified: info.modified,
            source: Arc::new(FileSource::new(root.join(&info.path), info.size)),
        });
        count += 1;
    }
    tracing::Span::current().record("files", count);
    Ok(())
}
