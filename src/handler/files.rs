//! File delivery handlers
//!
//! Maps delivery outcomes onto HTTP responses. A missing file is reported
//! differently per route: `/plain` and `/chunked` answer with a JSON error
//! payload and status 200, `/range` with a real 404.

use crate::config::AppState;
use crate::delivery::{DeliveryError, FileDeliveryService, FullDelivery, RangeDelivery};
use crate::handler::router::RequestContext;
use crate::http::{self, body, response, ResponseBody};
use hyper::Response;
use std::time::Duration;

/// `GET /plain/{name}`
pub async fn serve_plain(name: &str, state: &AppState) -> Response<ResponseBody> {
    match state.delivery.full(name).await {
        Ok(full) => full_response(full, &state.cache_control),
        Err(e) => payload_error(&e),
    }
}

/// `GET /chunked/{name}?chunks=N`
pub async fn serve_chunked(
    ctx: &RequestContext<'_>,
    name: &str,
    state: &AppState,
) -> Response<ResponseBody> {
    let resource = match state.delivery.resolve(name).await {
        Ok(resource) => resource,
        Err(e) => return payload_error(&e),
    };

    let chunks = match ctx.query_param("chunks") {
        None => state.config.delivery.default_chunks,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(n) => n,
            Err(_) => return payload_error(&DeliveryError::InvalidChunkCount(raw)),
        },
    };

    match state.delivery.chunked_resource(resource, chunks).await {
        Ok(delivery) => {
            let delay_ms =
                u64::try_from(state.delivery.chunk_delay().as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(
                file = %delivery.resource.path().display(),
                length = delivery.plan.length(),
                chunk_size = delivery.plan.chunk_size(),
                expected_chunks = delivery.plan.expected_chunks(),
                delay_ms,
                "Starting chunked delivery"
            );
            response::build_streaming_response(
                body::streaming(delivery.body),
                &state.config.delivery.chunked_content_type,
                &state.cache_control,
            )
        }
        Err(e) => payload_error(&e),
    }
}

/// `GET /range/{name}?delay=SECONDS` with optional `Range` header
pub async fn serve_range(
    ctx: &RequestContext<'_>,
    name: &str,
    state: &AppState,
) -> Response<ResponseBody> {
    let resource = match state.delivery.resolve(name).await {
        Ok(resource) => resource,
        Err(DeliveryError::NotFound) => return http::build_404_response(),
        Err(e) => return payload_error(&e),
    };

    let delay_secs = match ctx.query_param("delay") {
        None => 0,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) => secs,
            Err(_) => return payload_error(&DeliveryError::InvalidDelay(raw)),
        },
    };

    let delivery = FileDeliveryService::range_resource(
        resource,
        ctx.range_header,
        Duration::from_secs(delay_secs),
    )
    .await;

    match delivery {
        Ok(RangeDelivery::Full(full)) => full_response(full, &state.cache_control),
        Ok(RangeDelivery::Partial {
            resource,
            range,
            body: stream,
        }) => response::build_partial_response(
            body::streaming(stream),
            &resource.content_type(),
            &state.cache_control,
            range,
            resource.length(),
            (delay_secs > 0).then_some(delay_secs),
        ),
        Err(DeliveryError::NotFound) => http::build_404_response(),
        Err(DeliveryError::RangeNotSatisfiable { length }) => http::build_416_response(length),
        Err(e) => payload_error(&e),
    }
}

fn full_response(full: FullDelivery, cache_control: &str) -> Response<ResponseBody> {
    response::build_full_response(full.data, &full.resource.content_type(), cache_control)
}

/// JSON error payload for `/plain` and `/chunked`, and for bad parameters
fn payload_error(error: &DeliveryError) -> Response<ResponseBody> {
    match error {
        DeliveryError::NotFound => http::build_error_payload(200, "File not found"),
        DeliveryError::InvalidChunkCount(_) | DeliveryError::InvalidDelay(_) => {
            tracing::debug!("Rejected request: {error}");
            http::build_error_payload(400, &error.to_string())
        }
        DeliveryError::RangeNotSatisfiable { length } => http::build_416_response(*length),
        DeliveryError::Read(e) => {
            tracing::error!("Failed to read file: {e}");
            http::build_500_response()
        }
    }
}
