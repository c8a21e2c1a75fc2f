//! Archive Unpacking

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{self, Read, Seek};
use std::path::Path;
use tracing::instrument;
use zip::ZipArchive;

/// A single file extracted from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Final path component of the entry; directory structure is discarded.
    pub name: String,
    /// Full path of the entry inside the archive, as stored.
    pub path: String,
    /// Decompressed contents.
    pub data: Vec<u8>,
}

/// A file entry left in the archive because it is over the size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oversized {
    pub name: String,
    pub path: String,
    /// The declared size, or a lower bound when the declaration was too
    /// small and decompression was cut short.
    pub size: u64,
}

/// What [`unpack`] extracted, and what it refused to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unpacked {
    pub entries: Vec<Entry>,
    pub oversized: Vec<Oversized>,
}

impl Unpacked {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.oversized.is_empty()
    }
}

/// Unpack every file entry of a ZIP archive.
///
/// Directory entries are skipped and nested files are flattened to their
/// final path component, so `a/b/c.txt` becomes `c.txt`. Entries keep the
/// order of the archive's central directory.
///
/// No entry larger than `max_entry_size` is held in memory: entries that
/// declare a larger size are never decompressed, and decompression stops
/// one byte past the limit for entries that understate it. Both end up in
/// [`Unpacked::oversized`].
#[instrument(skip(reader), fields(entries, oversized))]
pub fn unpack<R: Read + Seek>(reader: R, max_entry_size: u64) -> Result<Unpacked> {
    let mut zip = ZipArchive::new(reader).or_raise(|| ErrorKind::InvalidData)?;
    let mut unpacked = Unpacked::default();
    for index in 0..zip.len() {
        let file = zip.by_index(index).or_raise(|| ErrorKind::InvalidData)?;
        if file.is_dir() {
            continue;
        }
        let path = file.name().to_string();
        let Some(name) = flatten(&path) else {
            tracing::debug!(path = %path, "Skipping archive entry without a file name");
            continue;
        };
        let declared = file.size();
        if declared > max_entry_size {
            unpacked.oversized.push(Oversized { name, path, size: declared });
            continue;
        }
        match read_capped(file, max_entry_size).or_raise(|| ErrorKind::InvalidData)? {
            Some(data) => unpacked.entries.push(Entry { name, path, data }),
            None => unpacked.oversized.push(Oversized {
                name,
                path,
                size: max_entry_size.saturating_add(1),
            }),
        }
    }
    tracing::Span::current()
        .record("entries", unpacked.entries.len())
        .record("oversized", unpacked.oversized.len());
    Ok(unpacked)
}

/// Read at most `limit` bytes; `None` if there was more.
fn read_capped(reader: impl Read, limit: u64) -> io::Result<Option<Vec<u8>>> {
    let mut data = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut data)?;
    Ok((data.len() as u64 <= limit).then_some(data))
}

fn flatten(path: &str) -> Option<String> {
    // ZIP always uses forward slashes, but archives made on Windows sometimes
    // don't get the memo.
    let last = path.rsplit(['/', '\\']).next()?;
    Path::new(last).file_name().and_then(|n| n.to_str()).map(str::to_string)
}
