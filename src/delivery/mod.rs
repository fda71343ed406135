//! File delivery service
//!
//! Serves the bytes of files below a root directory in three ways:
//! - whole file as one buffer
//! - paced chunks with a fixed delay before each chunk
//! - a single byte range selected by a `Range` header
//!
//! Everything here is request scoped: each call resolves the file again,
//! opens its own handle and hands back a body the caller streams out.

mod chunked;
mod error;
mod resource;
mod window;

pub use chunked::{paced_chunks, ChunkPlan};
pub use error::DeliveryError;
pub use resource::FileResource;
pub use window::range_window;

use crate::config::DeliveryConfig;
use crate::http::{parse_range_header, RangeParseResult, RangeSpec};
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Lazily produced response body
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// A whole file read into memory
pub struct FullDelivery {
    pub resource: FileResource,
    pub data: Bytes,
}

/// A file handed out in paced chunks
pub struct ChunkedDelivery {
    pub resource: FileResource,
    pub plan: ChunkPlan,
    pub body: ByteStream,
}

/// Outcome of a range request
pub enum RangeDelivery {
    /// No usable `Range` header; the whole file
    Full(FullDelivery),
    /// The requested window only
    Partial {
        resource: FileResource,
        range: RangeSpec,
        body: ByteStream,
    },
}

/// Delivers files below a fixed root directory
#[derive(Debug, Clone)]
pub struct FileDeliveryService {
    root: PathBuf,
    chunk_delay: Duration,
}

impl FileDeliveryService {
    pub fn new(root: impl Into<PathBuf>, chunk_delay: Duration) -> Self {
        Self {
            root: root.into(),
            chunk_delay,
        }
    }

    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::new(&config.root, Duration::from_millis(config.chunk_delay_ms))
    }

    pub const fn chunk_delay(&self) -> Duration {
        self.chunk_delay
    }

    pub async fn resolve(&self, name: &str) -> Result<FileResource, DeliveryError> {
        FileResource::resolve(&self.root, name).await
    }

    /// Read the whole file
    pub async fn full(&self, name: &str) -> Result<FullDelivery, DeliveryError> {
        let resource = self.resolve(name).await?;
        read_full(resource).await
    }

    /// Split the file into `chunks` pieces, each sent after the configured delay
    ///
    /// The file is resolved before the chunk count is checked, so a missing
    /// file wins over an invalid count.
    pub async fn chunked(
        &self,
        name: &str,
        chunks: i64,
    ) -> Result<ChunkedDelivery, DeliveryError> {
        let resource = self.resolve(name).await?;
        self.chunked_resource(resource, chunks).await
    }

    /// [`chunked`](Self::chunked) for an already resolved file
    pub async fn chunked_resource(
        &self,
        resource: FileResource,
        chunks: i64,
    ) -> Result<ChunkedDelivery, DeliveryError> {
        let plan = ChunkPlan::new(resource.length(), chunks)?;
        let file = resource.open().await?;

        Ok(ChunkedDelivery {
            resource,
            plan,
            body: paced_chunks(file, plan, self.chunk_delay).boxed(),
        })
    }

    /// Serve the window named by `range_header`, or the whole file without one
    ///
    /// Headers that are not a single `bytes=` range are ignored. `delay` is
    /// only applied to partial responses.
    pub async fn range(
        &self,
        name: &str,
        range_header: Option<&str>,
        delay: Duration,
    ) -> Result<RangeDelivery, DeliveryError> {
        let resource = self.resolve(name).await?;
        Self::range_resource(resource, range_header, delay).await
    }

    /// [`range`](Self::range) for an already resolved file
    pub async fn range_resource(
        resource: FileResource,
        range_header: Option<&str>,
        delay: Duration,
    ) -> Result<RangeDelivery, DeliveryError> {
        let length = resource.length();

        match parse_range_header(range_header, length) {
            RangeParseResult::Valid(range) => {
                let file = resource.open().await?;
                tracing::debug!(
                    file = %resource.path().display(),
                    start = range.start,
                    end = range.end,
                    length,
                    "Serving partial content"
                );
                Ok(RangeDelivery::Partial {
                    resource,
                    range,
                    body: range_window(file, range, delay).boxed(),
                })
            }
            RangeParseResult::NotSatisfiable => {
                tracing::debug!(range = ?range_header, length, "Range not satisfiable");
                Err(DeliveryError::RangeNotSatisfiable { length })
            }
            RangeParseResult::None => {
                if let Some(header) = range_header {
                    tracing::debug!(range = header, "Ignoring unusable Range header");
                }
                read_full(resource).await.map(RangeDelivery::Full)
            }
        }
    }
}

async fn read_full(resource: FileResource) -> Result<FullDelivery, DeliveryError> {
    let data = tokio::fs::read(resource.path()).await?;
    Ok(FullDelivery {
        resource,
        data: Bytes::from(data),
    })
}
