use super::{ByteSource, ByteStream, check_range};
use crate::source::error::{ErrorKind, Result};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::io::SeekFrom;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Content of a file on disk, read lazily.
///
/// The length is captured when the source is created; the file is reopened
/// on every read.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    len: u64,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, len: u64) -> Self {
        Self { path: path.into(), len }
    }

    /// Create a source for `path`, taking the length from its metadata.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path).await.or_raise(|| ErrorKind::Read(path.clone()))?;
        Ok(Self::new(path, metadata.len()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self) -> ErrorKind {
        ErrorKind::Read(self.path.clone())
    }
}

#[async_trait]
impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    async fn read_range(&self, range: Range<u64>) -> Result<Vec<u8>> {
        check_range(&range, self.len)?;
        let mut file = fs::File::open(&self.path).await.or_raise(|| self.read_error())?;
        file.seek(SeekFrom::Start(range.start)).await.or_raise(|| self.read_error())?;
        let mut buffer = Vec::with_capacity((range.end - range.start) as usize);
        file.take(range.end - range.start).read_to_end(&mut buffer).await.or_raise(|| self.read_error())?;
        Ok(buffer)
    }

    async fn read_all(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).await.or_raise(|| self.read_error())
    }

    fn stream(&self, chunk_size: usize) -> ByteStream<'_> {
        Box::pin(stream!({
            let mut file = match fs::File::open(&self.path).await.or_raise(|| self.read_error()) {
                Ok(file) => file,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            let mut buffer = vec![0; chunk_size.max(1)];
            loop {
                match file.read(&mut buffer).await.or_raise(|| self.read_error()) {
                    Ok(0) => break,
                    Ok(n) => yield Ok(buffer[..n].to_vec()),
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    async fn fixture(contents: &[u8]) -> (tempfile::TempDir, FileSource) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, contents).await.unwrap();
        let source = FileSource::open(&path).await.unwrap();
        (dir, source)
    }

    #[tokio::test]
    async fn test_open_reads_length() {
        let (_dir, source) = fixture(b"0123456789").await;
        assert_eq!(source.len(), 10);
        assert!(!source.is_empty());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let err = FileSource::open("/definitely/not/here.txt").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Read(_)));
    }

    #[tokio::test]
    async fn test_read_range_and_all() {
        let (_dir, source) = fixture(b"0123456789").await;
        assert_eq!(source.read_range(2..5).await.unwrap(), b"234");
        assert_eq!(source.read_all().await.unwrap(), b"0123456789");
        assert!(source.read_range(5..11).await.is_err());
        assert_eq!(source.read_text().await.unwrap(), "0123456789");
    }

    #[tokio::test]
    async fn test_stream() {
        let (_dir, source) = fixture(b"0123456789").await;
        let chunks: Vec<Vec<u8>> = source.stream(4).try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"0123456789");
        assert!(chunks.iter().all(|c| c.len() <= 4));
    }
}
