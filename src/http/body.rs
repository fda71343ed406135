//! Response body types
//!
//! Every response shares one boxed body type so buffered payloads and lazily
//! produced file streams can be returned from the same handler.

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use std::io;

/// Body of every response produced by the server
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Single buffered body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Empty body
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body backed by a lazy sequence of buffers
///
/// An `Err` item aborts the response; hyper closes the connection.
pub fn streaming<S>(stream: S) -> ResponseBody
where
    S: Stream<Item = io::Result<Bytes>> + Send + 'static,
{
    StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync()
}
