//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use secrecy::SecretString;
use tracing::warn;

use crate::prompt::DEFAULT_SYSTEM_PROMPT;

/// Which upstream protocol the relay speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMode {
    /// One `POST /chat/completions` call per message.
    Chat,
    /// Thread → message → run → poll → read messages.
    Assistant,
}

impl UpstreamMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "chat" | "completions" => Some(Self::Chat),
            "assistant" | "assistants" | "threads" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// Runtime configuration for tutor-server.
///
/// Every field except the credential has a default, so the server starts
/// without any environment variables set. A missing credential is reported
/// per request, not at startup.
#[derive(Debug)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,

    /// Upstream API credential (`OPENAI_API_KEY`).
    pub api_key: Option<SecretString>,

    /// Base URL of the OpenAI-compatible API, without a trailing slash.
    pub base_url: String,

    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,

    pub upstream_mode: UpstreamMode,

    /// Required when `upstream_mode` is [`UpstreamMode::Assistant`].
    pub assistant_id: Option<String>,

    pub poll_interval: Duration,
    pub max_polls: u32,
    pub run_timeout: Duration,

    /// Timeout applied to every individual upstream HTTP call.
    pub upstream_timeout: Duration,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_mode = match lookup("TUTOR_UPSTREAM_MODE") {
            Some(raw) => UpstreamMode::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "unknown TUTOR_UPSTREAM_MODE; using 'chat'");
                UpstreamMode::Chat
            }),
            None => UpstreamMode::Chat,
        };

        Self {
            bind_address: env_or(&lookup, "TUTOR_BIND", "0.0.0.0:3000"),
            log_level: env_or(&lookup, "TUTOR_LOG", "info"),
            log_json: parse_flag(&lookup, "TUTOR_LOG_JSON", false),
            enable_swagger: parse_flag(&lookup, "TUTOR_ENABLE_SWAGGER", true),
            api_key: non_empty(&lookup, "OPENAI_API_KEY").map(SecretString::new),
            base_url: env_or(&lookup, "TUTOR_OPENAI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_owned(),
            model: env_or(&lookup, "TUTOR_MODEL", "gpt-4o-mini"),
            temperature: parse_env(&lookup, "TUTOR_TEMPERATURE", 0.7),
            max_tokens: parse_env(&lookup, "TUTOR_MAX_TOKENS", 500),
            system_prompt: non_empty(&lookup, "TUTOR_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_owned()),
            upstream_mode,
            assistant_id: non_empty(&lookup, "TUTOR_ASSISTANT_ID"),
            poll_interval: Duration::from_millis(parse_env(
                &lookup,
                "TUTOR_POLL_INTERVAL_MS",
                1000,
            )),
            max_polls: parse_env(&lookup, "TUTOR_MAX_POLLS", 60),
            run_timeout: Duration::from_secs(parse_env(&lookup, "TUTOR_RUN_TIMEOUT_SECS", 120)),
            upstream_timeout: Duration::from_secs(parse_env(
                &lookup,
                "TUTOR_UPSTREAM_TIMEOUT_SECS",
                60,
            )),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_owned())
}

fn non_empty<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_flag<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: bool) -> bool {
    lookup(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, %default, "malformed value; using default");
            default
        }),
        None => default,
    }
}
