//! HTTP response building module
//!
//! Provides builders for the HTTP responses the server sends, decoupled from
//! delivery logic.

use super::body::{self, ResponseBody};
use super::range::RangeSpec;
use bytes::Bytes;
use hyper::Response;

/// Header echoing the artificial latency applied to a range response
pub const SIMULATED_DELAY_HEADER: &str = "X-Simulated-Delay";

/// Build 200 response carrying a whole file
pub fn build_full_response(
    data: Bytes,
    content_type: &str,
    cache_control: &str,
) -> Response<ResponseBody> {
    let content_length = data.len();

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Cache-Control", cache_control)
        .body(body::full(data))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(body::empty())
        })
}

/// Build 200 response whose body is produced lazily
///
/// No `Content-Length` is sent; the body ends when the stream does.
pub fn build_streaming_response(
    stream: ResponseBody,
    content_type: &str,
    cache_control: &str,
) -> Response<ResponseBody> {
    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Cache-Control", cache_control)
        .body(stream)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(body::empty())
        })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    stream: ResponseBody,
    content_type: &str,
    cache_control: &str,
    range: RangeSpec,
    total_size: u64,
    delay_secs: Option<u64>,
) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(206)
        .header("Content-Type", content_type)
        .header("Content-Length", range.len())
        .header("Content-Range", range.content_range(total_size))
        .header("Accept-Ranges", "bytes")
        .header("Cache-Control", cache_control);

    if let Some(delay) = delay_secs {
        builder = builder.header(SIMULATED_DELAY_HEADER, delay);
    }

    builder.body(stream).unwrap_or_else(|e| {
        log_build_error("206", &e);
        Response::new(body::empty())
    })
}

/// Build a JSON error payload (`{"error": "..."}`) with the given status
///
/// Plain and chunked delivery report a missing file this way with status 200.
pub fn build_error_payload(status: u16, message: &str) -> Response<ResponseBody> {
    let payload = serde_json::json!({ "error": message }).to_string();

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", payload.len())
        .body(body::full(payload))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(body::empty())
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(body::full("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(body::full("404 Not Found"))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET")
        .body(body::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(body::full("405 Method Not Allowed"))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    Response::builder()
        .status(416)
        .header("Content-Range", format!("bytes */{file_size}"))
        .header("Content-Length", 0)
        .body(body::empty())
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(body::empty())
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain")
        .body(body::full("500 Internal Server Error"))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(body::full("500 Internal Server Error"))
        })
}

/// Build health check response
pub fn build_health_response(status: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache")
        .body(body::full(status))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(body::full(status))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!("Failed to build {status} response: {error}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn header<'a>(resp: &'a Response<ResponseBody>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_error_payload_shape() {
        let resp = build_error_payload(200, "File not found");
        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "content-type"), Some("application/json"));

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "File not found" }));
    }

    #[test]
    fn test_partial_headers() {
        let range = RangeSpec { start: 500, end: 999 };
        let resp = build_partial_response(
            body::empty(),
            "text/plain",
            "max-age=3600",
            range,
            1000,
            Some(2),
        );
        assert_eq!(resp.status(), 206);
        assert_eq!(header(&resp, "content-range"), Some("bytes 500-999/1000"));
        assert_eq!(header(&resp, "content-length"), Some("500"));
        assert_eq!(header(&resp, "accept-ranges"), Some("bytes"));
        assert_eq!(header(&resp, "x-simulated-delay"), Some("2"));
    }

    #[test]
    fn test_partial_without_delay_has_no_delay_header() {
        let range = RangeSpec { start: 0, end: 0 };
        let resp = build_partial_response(body::empty(), "text/plain", "no-cache", range, 1, None);
        assert!(header(&resp, SIMULATED_DELAY_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_416_has_no_body() {
        let resp = build_416_response(100);
        assert_eq!(resp.status(), 416);
        assert_eq!(header(&resp, "content-range"), Some("bytes */100"));
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }
}
