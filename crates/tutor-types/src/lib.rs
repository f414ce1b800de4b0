//! Request / response bodies exchanged between the chat client and the relay.
//!
//! The relay answers every `POST /chat` with exactly one of `reply` or
//! `error`. Both are modelled as optional fields on [`ChatResponse`] so a
//! client can detect bodies that carry neither.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The student's message, sent verbatim.
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// The tutor's answer (present on HTTP 200).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    /// Human-readable failure description (present on HTTP 500).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            error: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            reply: None,
            error: Some(text.into()),
        }
    }
}
