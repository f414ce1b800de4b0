//! The relay endpoint (`POST /chat`).
//!
//! Validates the student's message, checks that an upstream credential is
//! configured, and hands the message to the configured completion backend.
//! Every failure is normalised by [`RelayError`] into `500 { "error" }`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{debug, info, warn};
use tutor_types::{ChatRequest, ChatResponse};
use utoipa::OpenApi;

use crate::error::RelayError;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(relay_chat), components(schemas(ChatRequest, ChatResponse)))]
pub struct ChatApi;

/// Register the relay route.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(relay_chat))
}

/// Relay one student message to the completion API.
///
/// The body is read as raw bytes so that malformed JSON is reported through
/// the relay's own error shape instead of axum's plain-text rejections.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Tutor reply", body = ChatResponse),
        (status = 500, description = "Input, configuration or upstream failure", body = ChatResponse),
    )
)]
pub async fn relay_chat(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, RelayError> {
    info!("received chat request");

    let body = body.map_err(|e| {
        warn!(error = %e, "failed to read request body");
        RelayError::MissingInput
    })?;
    let message = parse_message(&body)?;

    let api_key = state
        .config
        .api_key
        .as_ref()
        .ok_or(RelayError::MissingCredential)?;

    debug!(backend = state.backend.name(), message_len = message.len(), "sending message upstream");
    let reply = state.backend.complete(api_key, &message).await?;

    info!(reply_len = reply.len(), "received reply from completion API");
    Ok(Json(ChatResponse::reply(reply)))
}

/// Extract a non-blank `message` from a JSON body.
fn parse_message(body: &[u8]) -> Result<String, RelayError> {
    let req: ChatRequest = serde_json::from_slice(body).map_err(|_| RelayError::MissingInput)?;
    if req.message.trim().is_empty() {
        return Err(RelayError::MissingInput);
    }
    Ok(req.message)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
