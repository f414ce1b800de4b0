//! Liveness endpoint reporting how the relay is wired to its upstream.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthStatus)))]
pub struct HealthApi;

/// Body of `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    /// Backend answering `/chat`: `chat` or `assistant`.
    pub upstream: &'static str,
    /// Whether `OPENAI_API_KEY` was set at startup. `/chat` fails every
    /// request while this is `false`.
    pub credential_configured: bool,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Never contacts the upstream API, so it answers 200 even when the
/// credential is missing.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Relay is up", body = HealthStatus)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        upstream: state.backend.name(),
        credential_configured: state.config.api_key.is_some(),
    })
}
