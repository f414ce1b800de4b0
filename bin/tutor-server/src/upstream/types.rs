//! Wire types for the OpenAI-compatible upstream API.
//!
//! Response types keep every field the relay inspects optional or defaulted;
//! shape problems are reported as [`RelayError::MalformedUpstream`] by the
//! caller rather than as serde errors.
//!
//! [`RelayError::MalformedUpstream`]: crate::error::RelayError::MalformedUpstream

use serde::{Deserialize, Serialize};

// ── Chat completions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CompletionMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<CompletionMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if the response has one.
    pub fn first_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
    }
}

// ── Assistant threads ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
}

/// Lifecycle of an assistant run.
///
/// Only [`RunStatus::Queued`] and [`RunStatus::InProgress`] keep the poll loop
/// going; anything else, including statuses this build does not know about,
/// settles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_pending(self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewThreadMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRun<'a> {
    pub assistant_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub data: Vec<ThreadMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentPart {
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    pub value: String,
}

impl MessageList {
    /// Text of the newest assistant message. The API lists newest first.
    pub fn latest_assistant_text(self) -> Option<String> {
        self.data
            .into_iter()
            .filter(|m| m.role == "assistant")
            .find_map(|m| m.content.into_iter().find_map(|part| part.text))
            .map(|t| t.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_run_status_is_not_pending() {
        let run: Run = serde_json::from_value(json!({ "id": "run_1", "status": "paused_by_alien" }))
            .unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_pending());
    }

    #[test]
    fn only_queued_and_in_progress_are_pending() {
        assert!(RunStatus::Queued.is_pending());
        assert!(RunStatus::InProgress.is_pending());
        for s in [
            RunStatus::RequiresAction,
            RunStatus::Cancelling,
            RunStatus::Cancelled,
            RunStatus::Failed,
            RunStatus::Completed,
            RunStatus::Expired,
        ] {
            assert!(!s.is_pending(), "{s:?} should settle the poll loop");
        }
    }

    #[test]
    fn first_text_requires_message_content() {
        let resp: CompletionResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "role": "assistant" } }] }))
                .unwrap();
        assert_eq!(resp.first_text(), None);
    }

    #[test]
    fn latest_assistant_text_ignores_user_messages() {
        let list: MessageList = serde_json::from_value(json!({
            "data": [
                { "role": "user", "content": [{ "type": "text", "text": { "value": "2+2?" } }] },
                { "role": "assistant", "content": [{ "type": "text", "text": { "value": "4" } }] }
            ]
        }))
        .unwrap();
        assert_eq!(list.latest_assistant_text().as_deref(), Some("4"));
    }
}
