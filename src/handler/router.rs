//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route matching
//! and dispatch to the delivery handlers.

use crate::config::{AppState, RoutesConfig};
use crate::handler::files;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const PLAIN_PREFIX: &str = "/plain/";
const CHUNKED_PREFIX: &str = "/chunked/";
const RANGE_PREFIX: &str = "/range/";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub range_header: Option<&'a str>,
}

impl RequestContext<'_> {
    /// First value of a query parameter, percent-decoded
    pub fn query_param(&self, key: &str) -> Option<String> {
        let query = self.query?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    // The request body is never read
    let (parts, _) = req.into_parts();
    let method = &parts.method;
    let uri = &parts.uri;
    let headers = &parts.headers;

    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let ctx = RequestContext {
        path: uri.path(),
        query: uri.query(),
        range_header: header_str("range"),
    };

    let response = if *method == Method::GET {
        route_request(&ctx, &state).await
    } else {
        tracing::warn!("Method not allowed: {method}");
        http::build_405_response()
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            method.to_string(),
            ctx.path.to_string(),
        );
        entry.query = ctx.query.map(ToString::to_string);
        entry.http_version = http_version(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        entry.range = ctx.range_header.map(ToString::to_string);
        entry.referer = header_str("referer").map(ToString::to_string);
        entry.user_agent = header_str("user-agent").map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and configuration
async fn route_request(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<ResponseBody> {
    if let Some(resp) = health_check(ctx.path, &state.config.routes) {
        return resp;
    }

    if let Some(name) = ctx.path.strip_prefix(PLAIN_PREFIX) {
        return files::serve_plain(&decode_name(name), state).await;
    }

    if let Some(name) = ctx.path.strip_prefix(CHUNKED_PREFIX) {
        return files::serve_chunked(ctx, &decode_name(name), state).await;
    }

    if let Some(name) = ctx.path.strip_prefix(RANGE_PREFIX) {
        return files::serve_range(ctx, &decode_name(name), state).await;
    }

    http::build_404_response()
}

/// Health check endpoints, always fast
fn health_check(path: &str, routes: &RoutesConfig) -> Option<Response<ResponseBody>> {
    let health = &routes.health;
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        Some(http::build_health_response("ok"))
    } else {
        None
    }
}

/// Percent-decode a file name taken from the path
///
/// Undecodable names are kept as-is; they simply won't resolve.
fn decode_name(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned)
}

const fn http_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
