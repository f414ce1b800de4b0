//! Upstream completion backends.
//!
//! The relay talks to exactly one [`CompletionBackend`], chosen at startup by
//! `TUTOR_UPSTREAM_MODE`:
//! - [`ChatCompletions`]: a single `POST /chat/completions` call.
//! - [`AssistantThreads`]: thread → message → run → poll → read messages.

mod assistants;
mod completions;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{Config, UpstreamMode};
use crate::error::RelayError;

pub use assistants::AssistantThreads;
pub use completions::ChatCompletions;

/// Produces the tutor's reply for one student message.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn complete(&self, api_key: &SecretString, message: &str) -> Result<String, RelayError>;
}

/// Build the backend selected by `cfg.upstream_mode`.
pub fn from_config(cfg: &Config) -> Result<Arc<dyn CompletionBackend>, reqwest::Error> {
    let http = reqwest::Client::builder()
        .timeout(cfg.upstream_timeout)
        .build()?;

    Ok(match cfg.upstream_mode {
        UpstreamMode::Chat => Arc::new(ChatCompletions::new(http, cfg)),
        UpstreamMode::Assistant => Arc::new(AssistantThreads::new(http, cfg)),
    })
}

/// Read an upstream response, mapping failure statuses and error envelopes to
/// [`RelayError::Upstream`] and shape problems to
/// [`RelayError::MalformedUpstream`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, RelayError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    let body: Option<Value> = serde_json::from_slice(&bytes).ok();

    if !status.is_success() {
        return Err(RelayError::Upstream(
            body.as_ref()
                .and_then(envelope_message)
                .unwrap_or_else(|| fallback_message(status)),
        ));
    }

    let body = body.ok_or(RelayError::MalformedUpstream)?;
    if body.get("error").is_some_and(|e| !e.is_null()) {
        return Err(RelayError::Upstream(
            envelope_message(&body).unwrap_or_else(|| fallback_message(status)),
        ));
    }

    serde_json::from_value(body).map_err(|_| RelayError::MalformedUpstream)
}

/// `error.message` from an OpenAI-style error envelope.
fn envelope_message(body: &Value) -> Option<String> {
    body.get("error")?
        .get("message")?
        .as_str()
        .map(str::to_owned)
}

fn fallback_message(status: StatusCode) -> String {
    format!("OpenAI API error (status {})", status.as_u16())
}
