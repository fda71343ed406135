use crate::http::RangeSpec;
use async_stream::stream;
use bytes::Bytes;
use futures_util::Stream;
use std::io::{self, SeekFrom};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// One-element stream holding exactly the bytes of `range`
///
/// Nothing is read until the stream is polled; a non-zero `delay` is slept
/// first.
pub fn range_window<R>(
    reader: R,
    range: RangeSpec,
    delay: Duration,
) -> impl Stream<Item = io::Result<Bytes>> + Send
where
    R: AsyncRead + AsyncSeek + Unpin + Send + 'static,
{
    stream! {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match read_window(reader, range).await {
            Ok(data) => yield Ok(data),
            Err(e) => {
                tracing::error!(
                    start = range.start,
                    end = range.end,
                    "Error reading range: {e}"
                );
                yield Err(e);
            }
        }
    }
}

async fn read_window<R>(mut reader: R, range: RangeSpec) -> io::Result<Bytes>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let len = usize::try_from(range.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "range too large"))?;

    reader.seek(SeekFrom::Start(range.start)).await?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Seekable reader that records when it is dropped
    struct TrackedReader {
        inner: Cursor<Vec<u8>>,
        released: Arc<AtomicBool>,
    }

    impl TrackedReader {
        fn new(data: &[u8]) -> (Self, Arc<AtomicBool>) {
            let released = Arc::new(AtomicBool::new(false));
            let reader = Self {
                inner: Cursor::new(data.to_vec()),
                released: Arc::clone(&released),
            };
            (reader, released)
        }
    }

    impl Drop for TrackedReader {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    impl AsyncRead for TrackedReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    impl AsyncSeek for TrackedReader {
        fn start_seek(mut self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
            Pin::new(&mut self.inner).start_seek(position)
        }

        fn poll_complete(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
            Pin::new(&mut self.inner).poll_complete(cx)
        }
    }

    #[tokio::test]
    async fn test_reads_exact_window() {
        let data: Vec<u8> = (0u8..=99).collect();
        let range = RangeSpec { start: 10, end: 19 };
        let items: Vec<_> = range_window(Cursor::new(data), range, Duration::ZERO)
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        let bytes = items[0].as_ref().unwrap();
        assert_eq!(&bytes[..], &(10u8..=19).collect::<Vec<_>>()[..]);
    }

    #[tokio::test]
    async fn test_short_file_is_an_error() {
        // File shrank after the range was validated
        let range = RangeSpec { start: 2, end: 9 };
        let items: Vec<_> = range_window(Cursor::new(b"abcd".to_vec()), range, Duration::ZERO)
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].as_ref().unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_before_first_byte() {
        let range = RangeSpec { start: 0, end: 1 };
        let mut stream = Box::pin(range_window(
            Cursor::new(b"ab".to_vec()),
            range,
            Duration::from_secs(3),
        ));

        let started = tokio::time::Instant::now();
        let bytes = stream.next().await.unwrap().unwrap();
        assert_eq!(&bytes[..], b"ab");
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_unpolled_stream_releases_reader() {
        let (reader, released) = TrackedReader::new(b"abcdef");
        let stream = range_window(reader, RangeSpec { start: 1, end: 3 }, Duration::ZERO);
        assert!(!released.load(Ordering::SeqCst));

        drop(stream);
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_during_delay_releases_reader() {
        let (reader, released) = TrackedReader::new(b"abcdef");
        let range = RangeSpec { start: 0, end: 5 };
        let mut stream = Box::pin(range_window(reader, range, Duration::from_secs(10)));

        let pending = tokio::time::timeout(Duration::from_secs(1), stream.next()).await;
        assert!(pending.is_err());
        assert!(!released.load(Ordering::SeqCst));

        drop(stream);
        assert!(released.load(Ordering::SeqCst));
    }
}
