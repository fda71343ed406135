//! Paced chunk delivery
//!
//! A file is cut into `floor(length / chunks)` sized pieces which are handed
//! out one at a time, each after a fixed delay, to imitate a slow link.

use super::DeliveryError;
use async_stream::stream;
use bytes::Bytes;
use futures_util::Stream;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Upper bound for the initial allocation of a chunk buffer
const MAX_PREALLOC: u64 = 64 * 1024;

/// How a file of a given length is split into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    length: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    /// Plan delivery of `length` bytes in (roughly) `chunks` pieces
    ///
    /// When `length` is not divisible by `chunks` the remainder becomes one
    /// extra, shorter chunk. Requesting more chunks than there are bytes
    /// yields one-byte chunks.
    pub fn new(length: u64, chunks: i64) -> Result<Self, DeliveryError> {
        let count = u64::try_from(chunks)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| DeliveryError::InvalidChunkCount(chunks.to_string()))?;

        Ok(Self {
            length,
            chunk_size: (length / count).max(1),
        })
    }

    pub const fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub const fn length(&self) -> u64 {
        self.length
    }

    /// Number of buffers the stream will produce for an unchanged file
    pub const fn expected_chunks(&self) -> u64 {
        self.length.div_ceil(self.chunk_size)
    }
}

/// Stream the reader in `plan.chunk_size()` pieces, sleeping `delay` before each one
///
/// The reader is owned by the stream and dropped with it, so a client
/// disconnecting mid-transfer releases the file handle. A read error is
/// logged and ends the stream after being yielded once.
pub fn paced_chunks<R>(
    reader: R,
    plan: ChunkPlan,
    delay: Duration,
) -> impl Stream<Item = io::Result<Bytes>> + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let capacity = usize::try_from(plan.chunk_size().min(MAX_PREALLOC)).unwrap_or(0);

    stream! {
        let mut reader = reader;
        let mut sent = 0u64;

        loop {
            let mut buf = Vec::with_capacity(capacity);
            match (&mut reader).take(plan.chunk_size()).read_to_end(&mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    tokio::time::sleep(delay).await;
                    sent += 1;
                    tracing::trace!(chunk = sent, bytes = buf.len(), "Sending chunk");
                    yield Ok(Bytes::from(buf));
                }
                Err(e) => {
                    tracing::error!(chunk = sent + 1, "Error reading file: {e}");
                    yield Err(e);
                    break;
                }
            }
        }

        tracing::debug!(chunks = sent, "Chunked delivery finished");
    }
}
