use super::{ByteSource, ByteStream, check_range};
use crate::source::error::Result;
use async_trait::async_trait;
use std::ops::Range;
use std::sync::Arc;

/// Content held in memory. Cloning is cheap; the bytes are shared.
#[derive(Clone)]
pub struct MemorySource {
    bytes: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { bytes: bytes.into() }
    }
}

impl std::fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySource").field("len", &self.bytes.len()).finish()
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn read_range(&self, range: Range<u64>) -> Result<Vec<u8>> {
        check_range(&range, self.len())?;
        Ok(self.bytes[range.start as usize..range.end as usize].to_vec())
    }

    async fn read_all(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }

    fn stream(&self, chunk_size: usize) -> ByteStream<'_> {
        Box::pin(futures::stream::iter(self.bytes.chunks(chunk_size.max(1)).map(|chunk| Ok(chunk.to_vec()))))
    }
}
