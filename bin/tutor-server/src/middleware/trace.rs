use std::time::Instant;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, Limited};
use tracing::{Instrument, debug, info, info_span, warn};
use tutor_types::ChatResponse;
use uuid::Uuid;

use crate::error::RelayError;

pub static X_TRACE_ID: &str = "x-trace-id";

/// JSON bodies up to this size are logged verbatim at debug level.
const MAX_LOGGED_BODY: usize = 1024;

/// Largest request body the relay will buffer. A chat message is a short
/// JSON object; anything past this is refused before reaching a handler.
pub const MAX_REQUEST_BODY: usize = 64 * 1024;

/// Wrap each request in a span carrying a trace id, log its bodies at debug
/// level, and echo the trace id back in the `x-trace-id` response header.
///
/// An incoming `x-trace-id` that parses as a UUID is reused; otherwise a new
/// one is generated.
pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let req_bytes = match Limited::new(body, MAX_REQUEST_BODY).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(error = %e, limit = MAX_REQUEST_BODY, "request body rejected");
                let mut response = RelayError::MissingInput.into_response();
                if let Some(v) = header_value {
                    response.headers_mut().insert(X_TRACE_ID, v);
                }
                return response;
            }
        };
        log_body("request", &parts.headers, &req_bytes);
        let mut req = Request::from_parts(parts, Body::from(req_bytes));
        if let Some(v) = header_value.clone() {
            req.headers_mut().insert(X_TRACE_ID, v);
        }

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();
        let res_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(error = %e, "failed to buffer response body");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ChatResponse::error("failed to produce a response")),
                )
                    .into_response();
            }
        };
        log_body("response", &parts.headers, &res_bytes);
        let mut response = Response::from_parts(parts, Body::from(res_bytes));
        if let Some(v) = header_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}

fn log_body(direction: &str, headers: &HeaderMap, bytes: &Bytes) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.contains("application/json") && bytes.len() < MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(bytes) {
            debug!("{direction} body: {text}");
        }
    } else if !bytes.is_empty() {
        debug!(
            "{direction} body: [skipped: type={content_type}, size={}]",
            bytes.len()
        );
    }
}
