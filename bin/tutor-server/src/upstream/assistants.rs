use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use super::types::{MessageList, NewRun, NewThreadMessage, Run, RunStatus, Thread};
use super::{CompletionBackend, read_json};
use crate::config::Config;
use crate::error::RelayError;

const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Assistant-threads backend.
///
/// One student message becomes: create thread → post message → start run →
/// poll the run until it leaves `queued`/`in_progress` → read the newest
/// assistant message. Polling is bounded by `max_polls` and the whole
/// exchange by `run_timeout`.
pub struct AssistantThreads {
    http: reqwest::Client,
    base_url: String,
    assistant_id: Option<String>,
    poll_interval: Duration,
    max_polls: u32,
    run_timeout: Duration,
}

/// Poll-loop state for one run.
#[derive(Debug)]
enum PollState {
    Waiting { run: Run, polls: u32 },
    Settled(Run),
}

impl PollState {
    fn observe(run: Run, polls: u32) -> Self {
        if run.status.is_pending() {
            PollState::Waiting { run, polls }
        } else {
            PollState::Settled(run)
        }
    }
}

impl AssistantThreads {
    pub fn new(http: reqwest::Client, cfg: &Config) -> Self {
        Self {
            http,
            base_url: cfg.base_url.clone(),
            assistant_id: cfg.assistant_id.clone(),
            poll_interval: cfg.poll_interval,
            max_polls: cfg.max_polls,
            run_timeout: cfg.run_timeout,
        }
    }

    fn post(&self, key: &SecretString, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(key.expose_secret())
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    fn get(&self, key: &SecretString, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(key.expose_secret())
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    async fn run_exchange(
        &self,
        key: &SecretString,
        assistant_id: &str,
        message: &str,
    ) -> Result<String, RelayError> {
        let thread: Thread = read_json(
            self.post(key, "/threads")
                .json(&serde_json::json!({}))
                .send()
                .await?,
        )
        .await?;
        debug!(thread_id = %thread.id, "thread created");

        let _: serde_json::Value = read_json(
            self.post(key, &format!("/threads/{}/messages", thread.id))
                .json(&NewThreadMessage {
                    role: "user",
                    content: message,
                })
                .send()
                .await?,
        )
        .await?;

        let run: Run = read_json(
            self.post(key, &format!("/threads/{}/runs", thread.id))
                .json(&NewRun { assistant_id })
                .send()
                .await?,
        )
        .await?;
        debug!(thread_id = %thread.id, run_id = %run.id, status = ?run.status, "run started");

        let run = self.await_run(key, &thread.id, run).await?;
        if run.status != RunStatus::Completed {
            warn!(run_id = %run.id, status = ?run.status, "run settled without completing");
        }

        let messages: MessageList = read_json(
            self.get(key, &format!("/threads/{}/messages", thread.id))
                .send()
                .await?,
        )
        .await?;

        messages
            .latest_assistant_text()
            .ok_or(RelayError::NoResponse)
    }

    async fn await_run(
        &self,
        key: &SecretString,
        thread_id: &str,
        run: Run,
    ) -> Result<Run, RelayError> {
        let mut state = PollState::observe(run, 0);
        loop {
            state = match state {
                PollState::Settled(run) => return Ok(run),
                PollState::Waiting { polls, .. } if polls >= self.max_polls => {
                    warn!(thread_id, polls, "run still pending after poll limit");
                    return Err(RelayError::RunTimedOut);
                }
                PollState::Waiting { run, polls } => {
                    tokio::time::sleep(self.poll_interval).await;
                    let next: Run = read_json(
                        self.get(key, &format!("/threads/{thread_id}/runs/{}", run.id))
                            .send()
                            .await?,
                    )
                    .await?;
                    debug!(run_id = %next.id, status = ?next.status, poll = polls + 1, "run polled");
                    PollState::observe(next, polls + 1)
                }
            };
        }
    }
}

#[async_trait]
impl CompletionBackend for AssistantThreads {
    fn name(&self) -> &'static str {
        "assistant"
    }

    async fn complete(&self, api_key: &SecretString, message: &str) -> Result<String, RelayError> {
        let assistant_id = self
            .assistant_id
            .as_deref()
            .ok_or(RelayError::MissingAssistant)?;

        let reply = tokio::time::timeout(
            self.run_timeout,
            self.run_exchange(api_key, assistant_id, message),
        )
        .await
        .map_err(|_| RelayError::RunTimedOut)??;

        info!(output_len = reply.len(), "assistant run done");
        Ok(reply)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer, extra: &[(&str, &str)]) -> AssistantThreads {
        let uri = server.uri();
        let extra: Vec<(String, String)> = extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let cfg = Config::from_lookup(|key| match key {
            "TUTOR_OPENAI_BASE_URL" => Some(uri.clone()),
            "TUTOR_ASSISTANT_ID" => Some("asst_tutor".into()),
            "TUTOR_POLL_INTERVAL_MS" => Some("1".into()),
            other => extra
                .iter()
                .find(|(k, _)| k == other)
                .map(|(_, v)| v.clone()),
        });
        AssistantThreads::new(reqwest::Client::new(), &cfg)
    }

    fn key() -> SecretString {
        SecretString::new("sk-test".to_owned())
    }

    fn run(status: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1", "status": status }))
    }

    async fn mount_thread_setup(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/threads"))
            .and(header("OpenAI-Beta", "assistants=v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "thread_1" })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/messages"))
            .and(body_partial_json(json!({ "role": "user", "content": "What is 7 squared?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs"))
            .and(body_partial_json(json!({ "assistant_id": "asst_tutor" })))
            .respond_with(run("queued"))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_reply(server: &MockServer, text: &str) {
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "role": "assistant", "content": [{ "type": "text", "text": { "value": text } }] },
                    { "role": "user", "content": [{ "type": "text", "text": { "value": "What is 7 squared?" } }] }
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn polls_through_pending_statuses_then_reads_reply() {
        let server = MockServer::start().await;
        mount_thread_setup(&server).await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(run("in_progress"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(run("completed"))
            .expect(1)
            .mount(&server)
            .await;
        mount_reply(&server, "49").await;

        let reply = backend(&server, &[])
            .complete(&key(), "What is 7 squared?")
            .await
            .unwrap();
        assert_eq!(reply, "49");
    }

    #[tokio::test]
    async fn unknown_status_settles_and_reply_is_still_read() {
        let server = MockServer::start().await;
        mount_thread_setup(&server).await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(run("some_future_status"))
            .expect(1)
            .mount(&server)
            .await;
        mount_reply(&server, "49").await;

        let reply = backend(&server, &[])
            .complete(&key(), "What is 7 squared?")
            .await
            .unwrap();
        assert_eq!(reply, "49");
    }

    #[tokio::test]
    async fn failed_run_without_assistant_text_is_no_response() {
        let server = MockServer::start().await;
        mount_thread_setup(&server).await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(run("failed"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "role": "user", "content": [{ "type": "text", "text": { "value": "What is 7 squared?" } }] }
                ]
            })))
            .mount(&server)
            .await;

        let err = backend(&server, &[])
            .complete(&key(), "What is 7 squared?")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::NoResponse));
    }

    #[tokio::test]
    async fn poll_limit_is_enforced() {
        let server = MockServer::start().await;
        mount_thread_setup(&server).await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(run("queued"))
            .expect(3)
            .mount(&server)
            .await;

        let err = backend(&server, &[("TUTOR_MAX_POLLS", "3")])
            .complete(&key(), "What is 7 squared?")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::RunTimedOut));
    }

    #[tokio::test]
    async fn run_timeout_bounds_the_whole_exchange() {
        let server = MockServer::start().await;
        mount_thread_setup(&server).await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(run("in_progress"))
            .mount(&server)
            .await;

        let started = std::time::Instant::now();
        let err = backend(
            &server,
            &[("TUTOR_MAX_POLLS", "1000000"), ("TUTOR_RUN_TIMEOUT_SECS", "1")],
        )
        .complete(&key(), "What is 7 squared?")
        .await
        .unwrap_err();
        assert!(matches!(err, RelayError::RunTimedOut));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_assistant_id_fails_before_any_call() {
        let server = MockServer::start().await;
        let cfg = Config::from_lookup(|key| match key {
            "TUTOR_OPENAI_BASE_URL" => Some(server.uri()),
            _ => None,
        });
        let backend = AssistantThreads::new(reqwest::Client::new(), &cfg);

        let err = backend.complete(&key(), "hi").await.unwrap_err();
        assert!(matches!(err, RelayError::MissingAssistant));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
