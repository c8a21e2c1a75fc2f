//! Archive Packing

use crate::Compression;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::collections::HashSet;
use std::io::{Cursor, Seek, Write};
use tracing::instrument;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

impl Compression {
    fn options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(self.method())
            .compression_level(self.level().map(Into::into))
    }

    /// Pack named entries into an in-memory ZIP archive.
    ///
    /// Entries are written in iteration order. Names must be unique within
    /// the archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use renamr_archive::{Compression, unpack};
    /// use std::io::Cursor;
    ///
    /// let archive = Compression::Deflate
    ///     .pack([("hello.txt", b"Hello, world!".to_vec())])
    ///     .unwrap();
    /// let entries = unpack(Cursor::new(archive), u64::MAX).unwrap().entries;
    /// assert_eq!(entries[0].name, "hello.txt");
    /// assert_eq!(entries[0].data, b"Hello, world!");
    /// ```
    pub fn pack<N, I>(&self, entries: I) -> Result<Vec<u8>>
    where
        N: AsRef<str>,
        I: IntoIterator<Item = (N, Vec<u8>)>,
    {
        let mut output = Cursor::new(Vec::new());
        self.pack_into(entries, &mut output)?;
        Ok(output.into_inner())
    }

    /// Pack named entries into any seekable writer, returning the number of
    /// entries written.
    #[instrument(skip(entries, writer), fields(method = %self, entries))]
    pub fn pack_into<N, I, W>(&self, entries: I, writer: W) -> Result<usize>
    where
        N: AsRef<str>,
        I: IntoIterator<Item = (N, Vec<u8>)>,
        W: Write + Seek,
    {
        let mut zip = ZipWriter::new(writer);
        let mut seen = HashSet::new();
        for (name, data) in entries {
            let name = name.as_ref();
            if !seen.insert(name.to_string()) {
                exn::bail!(ErrorKind::DuplicateEntry(name.to_string()));
            }
            zip.start_file(name, self.options()).or_raise(|| ErrorKind::Encoder)?;
            zip.write_all(&data).or_raise(|| ErrorKind::Io)?;
        }
        zip.finish().or_raise(|| ErrorKind::Io)?;
        tracing::Span::current().record("entries", seen.len());
        Ok(seen.len())
    }
}
