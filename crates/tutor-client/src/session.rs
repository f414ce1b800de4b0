use std::collections::VecDeque;

use tracing::{info, warn};

use crate::relay::Relay;
use crate::state::{ChatEvent, ChatState, Effect, Notice, update};

/// Drives [`ChatState`] against a [`Relay`].
///
/// Events go through [`update`]; `SendRequest` effects are executed and their
/// outcome is fed back as `ReplyReceived` / `ReplyFailed`. Notifications are
/// handed back to the caller to display.
pub struct ChatSession<R> {
    state: ChatState,
    relay: R,
}

impl<R: Relay> ChatSession<R> {
    pub fn new(relay: R, state: ChatState) -> Self {
        Self { state, relay }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        update(&mut self.state, ChatEvent::InputChanged(text.into()));
    }

    /// Send the current input and wait for the exchange to settle.
    ///
    /// Returns the notifications raised along the way. Does nothing for blank
    /// input.
    pub async fn send(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        let mut pending: VecDeque<Effect> = update(&mut self.state, ChatEvent::SendInitiated).into();

        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::SendRequest(request) => {
                    let event = match self.relay.send(&request).await {
                        Ok(reply) => {
                            info!(reply_len = reply.len(), "reply received");
                            ChatEvent::ReplyReceived(reply)
                        }
                        Err(e) => {
                            warn!(error = %e, "exchange failed");
                            ChatEvent::ReplyFailed(e.to_string())
                        }
                    };
                    pending.extend(update(&mut self.state, event));
                }
                Effect::Notify(notice) => notices.push(notice),
            }
        }

        notices
    }
}
