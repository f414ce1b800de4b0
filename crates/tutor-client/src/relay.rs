//! HTTP client for the relay's `POST /chat` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};
use tutor_types::{ChatRequest, ChatResponse};

/// Errors that can end an exchange with the relay.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay could not be reached (connection refused, DNS, TLS, ...).
    #[error("could not reach the tutor service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay reported a failure, either with a non-2xx status or an
    /// `error` field.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// The relay answered 2xx with a body that is not a chat response.
    #[error("unexpected response from the tutor service")]
    Malformed,

    /// The relay answered 2xx without a `reply`.
    #[error("the tutor service returned no reply")]
    MissingReply,
}

/// Something that can exchange one chat message for a reply.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<String, ClientError>;
}

/// [`Relay`] over HTTP.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RelayClient {
    /// Client posting to `endpoint`, e.g. `http://127.0.0.1:3000/chat`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: endpoint.into(),
            api_key: None,
        })
    }

    /// Send `key` as both `apikey` and bearer `Authorization`, the convention
    /// of hosted-function gateways that sit in front of the relay.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Relay for RelayClient {
    async fn send(&self, request: &ChatRequest) -> Result<String, ClientError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header("apikey", key).bearer_auth(key);
        }

        debug!(endpoint = %self.endpoint, "sending message to relay");
        let resp = builder.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body: Option<ChatResponse> = serde_json::from_slice(&bytes).ok();

        if !status.is_success() {
            let message = body.and_then(|b| b.error).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            });
            warn!(status = status.as_u16(), %message, "relay returned an error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = body.ok_or(ClientError::Malformed)?;
        match (body.reply, body.error) {
            (Some(reply), _) => Ok(reply),
            (None, Some(message)) => Err(ClientError::Status {
                status: status.as_u16(),
                message,
            }),
            (None, None) => Err(ClientError::MissingReply),
        }
    }
}
