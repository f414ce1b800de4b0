use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use super::types::{CompletionMessage, CompletionRequest, CompletionResponse};
use super::{CompletionBackend, read_json};
use crate::config::Config;
use crate::error::RelayError;

/// Single-call chat-completion backend.
pub struct ChatCompletions {
    http: reqwest::Client,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl ChatCompletions {
    pub fn new(http: reqwest::Client, cfg: &Config) -> Self {
        Self {
            http,
            url: format!("{}/chat/completions", cfg.base_url),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            system_prompt: cfg.system_prompt.clone(),
        }
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletions {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn complete(&self, api_key: &SecretString, message: &str) -> Result<String, RelayError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                CompletionMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                CompletionMessage {
                    role: "user",
                    content: message,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, url = %self.url, "sending chat completion request");
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let completion: CompletionResponse = read_json(resp).await?;
        let reply = completion
            .first_text()
            .ok_or(RelayError::MalformedUpstream)?;

        info!(model = %self.model, output_len = reply.len(), "chat completion done");
        Ok(reply)
    }
}
