//! Size-bounded chunked reading shared by all backends.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::traits::{StorageError, StorageResult};

/// Chunk size used when streaming uploads.
pub(crate) const CHUNK_SIZE: usize = 1024 * 1024;

/// Reads a source stream chunk by chunk and fails the moment the running total
/// exceeds `limit`. Once it has failed, the source is never read again.
pub(crate) struct BoundedReader<R> {
    inner: R,
    limit: u64,
    total: u64,
    buf: Vec<u8>,
    exhausted: bool,
}

impl<R: AsyncRead + Unpin> BoundedReader<R> {
    pub(crate) fn new(inner: R, limit: u64) -> Self {
        Self::with_chunk_size(inner, limit, CHUNK_SIZE)
    }

    pub(crate) fn with_chunk_size(inner: R, limit: u64, chunk_size: usize) -> Self {
        Self {
            inner,
            limit,
            total: 0,
            buf: vec![0u8; chunk_size.max(1)],
            exhausted: false,
        }
    }

    /// Next chunk, or `None` at end of stream.
    pub(crate) async fn next_chunk(&mut self) -> StorageResult<Option<&[u8]>> {
        if self.exhausted {
            return Ok(None);
        }

        let n = self.inner.read(&mut self.buf).await.map_err(|e| {
            self.exhausted = true;
            StorageError::UploadFailed(format!("Failed to read upload stream: {}", e))
        })?;

        if n == 0 {
            self.exhausted = true;
            return Ok(None);
        }

        self.total += n as u64;
        if self.total > self.limit {
            self.exhausted = true;
            return Err(StorageError::PayloadTooLarge { limit: self.limit });
        }

        Ok(Some(&self.buf[..n]))
    }

    /// Bytes accepted so far.
    pub(crate) fn total(&self) -> u64 {
        self.total
    }
}
