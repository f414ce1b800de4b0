//! Unified relay error type.
//!
//! Every handler returns `Result<T, RelayError>`, which implements
//! [`axum::response::IntoResponse`]. All variants render as HTTP 500 with a
//! `{ "error": "..." }` body so the client sees one failure shape regardless
//! of where the exchange broke.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};
use tutor_types::ChatResponse;

/// All errors that can occur while relaying one chat message.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The body was not JSON, or carried no usable `message`.
    #[error("No message provided")]
    MissingInput,

    /// `OPENAI_API_KEY` is not set.
    #[error("OpenAI API key is not configured")]
    MissingCredential,

    /// Assistant mode is selected but `TUTOR_ASSISTANT_ID` is not set.
    #[error("Assistant id is not configured")]
    MissingAssistant,

    /// The completion API answered with a failure status or an error envelope.
    #[error("{0}")]
    Upstream(String),

    /// The completion API could not be reached at all.
    #[error("Failed to reach the completion API: {0}")]
    Transport(#[from] reqwest::Error),

    /// The completion API answered successfully but without the expected shape.
    #[error("Unexpected response format from the completion API")]
    MalformedUpstream,

    /// The assistant run settled without leaving an assistant message.
    #[error("No response was produced by the assistant")]
    NoResponse,

    /// The assistant run exceeded the poll bound or the overall timeout.
    #[error("Assistant run did not finish in time")]
    RunTimedOut,
}

impl RelayError {
    fn log(&self) {
        match self {
            RelayError::MissingInput => warn!("no message provided in request"),
            RelayError::MissingCredential | RelayError::MissingAssistant => {
                error!(error = %self, "relay is misconfigured")
            }
            RelayError::Upstream(m) => error!(message = %m, "completion API error"),
            RelayError::Transport(e) => error!(error = %e, "completion API unreachable"),
            RelayError::MalformedUpstream | RelayError::NoResponse => {
                error!(error = %self, "completion API contract violation")
            }
            RelayError::RunTimedOut => error!("assistant run timed out"),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        self.log();
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ChatResponse::error(self.to_string())),
        )
            .into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: RelayError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn every_error_is_a_500_with_error_body() {
        for err in [
            RelayError::MissingInput,
            RelayError::MissingCredential,
            RelayError::MalformedUpstream,
            RelayError::NoResponse,
            RelayError::RunTimedOut,
        ] {
            let expected = err.to_string();
            let (status, body) = render(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"], expected);
            assert!(body.get("reply").is_none());
        }
    }

    #[tokio::test]
    async fn upstream_message_is_passed_through() {
        let (_, body) = render(RelayError::Upstream("Invalid API key".into())).await;
        assert_eq!(body["error"], "Invalid API key");
    }
}
